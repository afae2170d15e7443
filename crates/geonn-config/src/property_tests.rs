//! Property tests for loading and saving configuration records.

use std::path::PathBuf;

use proptest::prelude::*;

use crate::{
    error::ConfigError,
    records::{InferenceConfig, TestConfig, TrainConfig},
    schema::{parse_u32, NONE_LITERAL},
};

// ============================================================
// Arbitrary Generators
// ============================================================

/// Any text, including surrounding whitespace, line breaks and `%`.
fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => prop::string::string_regex("[a-zA-Z0-9 %/._\t\n-]{0,16}").unwrap(),
        1 => Just(NONE_LITERAL.to_string()),
        1 => Just(String::new()),
    ]
}

/// Text that a config file can hold exactly: trimmed, single line, not
/// one of the "absent" spellings.
fn arb_clean_text() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9%/._-]([a-zA-Z0-9 %/._-]{0,14}[a-zA-Z0-9%/._-])?")
        .unwrap()
        .prop_filter("reads back as absent", |s| s != NONE_LITERAL)
}

fn arb_class_names(text: impl Strategy<Value = String>) -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(text.prop_map(|s| s.replace(',', "")), 0..6)
}

fn arb_train_config() -> impl Strategy<Value = TrainConfig> {
    (
        (arb_text(), any::<u32>(), any::<u32>(), any::<u32>()),
        (arb_text(), arb_text(), proptest::option::of(arb_text())),
        (
            proptest::option::of(arb_text()),
            arb_text(),
            proptest::option::of(arb_text()),
        ),
        (any::<u32>(), any::<u32>()),
    )
        .prop_map(
            |(
                (data_dir, in_channels, out_classes, img_size),
                (model_arch, encoder_name, encoder_weights),
                (input_model_path, output_model_path, output_train_metrics_path),
                (epochs, batch_size),
            )| TrainConfig {
                data_dir: PathBuf::from(data_dir),
                in_channels,
                out_classes,
                img_size,
                model_arch,
                encoder_name,
                encoder_weights,
                input_model_path: input_model_path.map(PathBuf::from),
                output_model_path: PathBuf::from(output_model_path),
                output_train_metrics_path: output_train_metrics_path.map(PathBuf::from),
                epochs,
                batch_size,
            },
        )
}

fn arb_test_config() -> impl Strategy<Value = TestConfig> {
    (
        arb_clean_text(),
        any::<u32>(),
        arb_class_names(arb_clean_text()).prop_filter("empty list", |names| !names.is_empty()),
        arb_clean_text(),
        arb_clean_text(),
    )
        .prop_map(
            |(data_dir, num_classes, class_names, model_path, output_path)| TestConfig {
                data_dir: PathBuf::from(data_dir),
                num_classes,
                class_names,
                model_path: PathBuf::from(model_path),
                output_path: PathBuf::from(output_path),
            },
        )
}

fn arb_inference_config() -> impl Strategy<Value = InferenceConfig> {
    (arb_clean_text(), any::<u32>(), arb_clean_text(), arb_clean_text()).prop_map(
        |(data_dir, num_classes, model_path, output_path)| InferenceConfig {
            data_dir: PathBuf::from(data_dir),
            num_classes,
            model_path: PathBuf::from(model_path),
            output_path: PathBuf::from(output_path),
        },
    )
}

/// Integer text with at least one character that is not an ASCII digit.
fn arb_non_integer() -> impl Strategy<Value = String> {
    prop::string::string_regex("[0-9]{0,3}[a-zA-Z+._-][0-9a-zA-Z+._-]{0,3}").unwrap()
}

const INFERENCE: &str = "\
[settings.dataset]
data_dir = /data/dop20/new
num_classes = 3

[settings.model]
model_path = /models/upernet_v1

[settings.output]
output_path = /results/predictions
";

// ============================================================
// Round-Trip Tests
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_train_config_saves_exactly_or_refuses(record in arb_train_config()) {
        match record.to_document() {
            Ok(document) => {
                let reloaded = TrainConfig::from_document(&document.to_string().parse().unwrap());
                prop_assert_eq!(reloaded.unwrap(), record);
            }
            Err(ConfigError::Unrepresentable { .. }) => {}
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn prop_test_config_round_trip(record in arb_test_config()) {
        let text = record.to_document().unwrap().to_string();
        let reloaded = TestConfig::from_document(&text.parse().unwrap()).unwrap();
        prop_assert_eq!(reloaded, record);
    }

    #[test]
    fn prop_inference_config_round_trip(record in arb_inference_config()) {
        let text = record.to_document().unwrap().to_string();
        let reloaded = InferenceConfig::from_document(&text.parse().unwrap()).unwrap();
        prop_assert_eq!(reloaded, record);
    }

    #[test]
    fn prop_class_names_with_surrounding_whitespace_are_refused(
        names in arb_class_names(arb_clean_text()),
        padded in arb_clean_text(),
    ) {
        let mut class_names = names;
        class_names.push(format!(" {padded}"));
        let record = TestConfig {
            data_dir: PathBuf::from("/data"),
            num_classes: 1,
            class_names,
            model_path: PathBuf::from("/models/m"),
            output_path: PathBuf::from("/results"),
        };
        let refused = matches!(
            record.to_document(),
            Err(ConfigError::Unrepresentable { .. })
        );
        prop_assert!(refused);
    }
}

// ============================================================
// Integer Field Tests
// ============================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_non_digit_integers_are_rejected(bad in arb_non_integer()) {
        prop_assert_eq!(parse_u32(&bad), None);

        let text = INFERENCE.replace("num_classes = 3", &format!("num_classes = {bad}"));
        match InferenceConfig::from_document(&text.parse().unwrap()) {
            Err(ConfigError::InvalidInteger { section, key, value }) => {
                prop_assert_eq!(section, "settings.dataset");
                prop_assert_eq!(key, "num_classes");
                prop_assert_eq!(value, bad);
            }
            other => prop_assert!(false, "expected InvalidInteger, got {other:?}"),
        }
    }

    #[test]
    fn prop_zero_padded_integers_are_accepted(n in any::<u32>(), zeros in 0usize..4) {
        let text = format!("{}{n}", "0".repeat(zeros));
        prop_assert_eq!(parse_u32(&text), Some(n));
    }

    #[test]
    fn prop_integers_above_u32_are_rejected(n in (u64::from(u32::MAX) + 1)..=u64::MAX) {
        prop_assert_eq!(parse_u32(&n.to_string()), None);
    }
}

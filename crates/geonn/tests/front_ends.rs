//! End-to-end runs of the three front-ends against a recording delegate.

use std::{io::Write, path::PathBuf};

use geonn::{
    config::{ConfigError, MismatchPolicy, TestConfig, CLASS_COUNT_MISMATCH_MESSAGE},
    inference_from_file, run_test_with_output, test_from_file, train_from_file, DelegateError,
    InferArgs, RunError, SegmentationDelegate, TestArgs, TrainArgs,
};
use tempfile::NamedTempFile;

#[derive(Debug, Default)]
struct RecordingDelegate {
    train: Vec<TrainArgs>,
    test: Vec<TestArgs>,
    infer: Vec<InferArgs>,
}

impl RecordingDelegate {
    fn calls(&self) -> usize {
        self.train.len() + self.test.len() + self.infer.len()
    }
}

impl SegmentationDelegate for RecordingDelegate {
    fn train(&mut self, args: &TrainArgs) -> Result<(), DelegateError> {
        self.train.push(args.clone());
        Ok(())
    }

    fn test(&mut self, args: &TestArgs) -> Result<(), DelegateError> {
        self.test.push(args.clone());
        Ok(())
    }

    fn infer(&mut self, args: &InferArgs) -> Result<(), DelegateError> {
        self.infer.push(args.clone());
        Ok(())
    }
}

const TRAIN: &str = "\
[settings.dataset]
data_dir = /data/dop20/train
in_channels = 4
out_classes = 6
img_size = 512

[settings.model]
model_arch = UPerNet
encoder_name = tu-convnext_base
encoder_weights = imagenet
epochs = 40
batch_size = 8
output_model_path = /models/upernet_v1
";

const TEST: &str = "\
[settings.dataset]
data_dir = /data/dop20/test
num_classes = 3
class_names = water, forest,urban

[settings.model]
model_path = /models/upernet_v1

[settings.output]
output_path = /results/upernet_v1
";

const INFERENCE: &str = "\
[settings.dataset]
data_dir = /data/dop20/new
num_classes = 3

[settings.model]
model_path = /models/upernet_v1

[settings.output]
output_path = /results/predictions
";

fn write_config(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn train_forwards_every_field() {
    let file = write_config(TRAIN);
    let mut delegate = RecordingDelegate::default();

    train_from_file(file.path(), &mut delegate).unwrap();

    assert_eq!(
        delegate.train,
        vec![TrainArgs {
            data_dir: PathBuf::from("/data/dop20/train"),
            img_size: 512,
            in_channels: 4,
            out_classes: 6,
            model_arch: "UPerNet".to_string(),
            encoder_name: "tu-convnext_base".to_string(),
            encoder_weights: Some("imagenet".to_string()),
            input_model_path: None,
            output_model_path: PathBuf::from("/models/upernet_v1"),
            output_train_metrics_path: None,
            epochs: 40,
            batch_size: 8,
        }]
    );
    assert_eq!(delegate.calls(), 1);
}

#[test]
fn train_passes_absent_optionals_as_null() {
    let file = write_config(TRAIN);
    let mut delegate = RecordingDelegate::default();
    train_from_file(file.path(), &mut delegate).unwrap();

    let payload = serde_json::to_value(&delegate.train[0]).unwrap();
    assert!(payload["input_model_path"].is_null());
    assert!(payload["output_train_metrics_path"].is_null());
}

#[test]
fn train_with_non_numeric_epochs_never_calls_library() {
    let file = write_config(&TRAIN.replace("epochs = 40", "epochs=five"));
    let mut delegate = RecordingDelegate::default();

    match train_from_file(file.path(), &mut delegate) {
        Err(RunError::Config(ConfigError::InvalidInteger { key, value, .. })) => {
            assert_eq!(key, "epochs");
            assert_eq!(value, "five");
        }
        other => panic!("Expected InvalidInteger error, got {other:?}"),
    }
    assert_eq!(delegate.calls(), 0);
}

#[test]
fn missing_required_key_never_calls_library() {
    let file = write_config(&INFERENCE.replace("num_classes = 3\n", ""));
    let mut delegate = RecordingDelegate::default();

    match inference_from_file(file.path(), &mut delegate) {
        Err(RunError::Config(ConfigError::MissingOption { section, key })) => {
            assert_eq!(section, "settings.dataset");
            assert_eq!(key, "num_classes");
        }
        other => panic!("Expected MissingOption error, got {other:?}"),
    }
    assert_eq!(delegate.calls(), 0);
}

#[test]
fn missing_file_never_calls_library() {
    let mut delegate = RecordingDelegate::default();
    let result = train_from_file("/definitely/not/here/train.ini", &mut delegate);

    assert!(matches!(result, Err(RunError::Config(ConfigError::Io { .. }))));
    assert_eq!(delegate.calls(), 0);
}

#[test]
fn test_with_matching_class_names_reports_nothing() {
    let file = write_config(TEST);
    let mut delegate = RecordingDelegate::default();

    let mismatch = test_from_file(file.path(), MismatchPolicy::Warn, &mut delegate).unwrap();

    assert_eq!(mismatch, None);
    assert_eq!(
        delegate.test,
        vec![TestArgs {
            data_dir: PathBuf::from("/data/dop20/test"),
            input_model_path: PathBuf::from("/models/upernet_v1"),
            num_classes: 3,
            class_names: vec![
                "water".to_string(),
                "forest".to_string(),
                "urban".to_string()
            ],
            output_path: PathBuf::from("/results/upernet_v1"),
        }]
    );
}

#[test]
fn test_with_class_mismatch_still_calls_library_when_warning() {
    let file = write_config(&TEST.replace("num_classes = 3", "num_classes = 2"));
    let mut delegate = RecordingDelegate::default();

    let mismatch = test_from_file(file.path(), MismatchPolicy::Warn, &mut delegate).unwrap();

    let mismatch = mismatch.expect("mismatch should be reported");
    assert_eq!((mismatch.names, mismatch.classes), (3, 2));
    assert_eq!(delegate.test.len(), 1);
    assert_eq!(delegate.test[0].num_classes, 2);
    assert_eq!(delegate.test[0].class_names.len(), 3);
}

#[test]
fn mismatch_diagnostic_is_written_verbatim() {
    let file = write_config(&TEST.replace("num_classes = 3", "num_classes = 4"));
    let config = TestConfig::load(file.path()).unwrap();
    let mut delegate = RecordingDelegate::default();
    let mut out = Vec::new();

    run_test_with_output(&config, MismatchPolicy::Warn, &mut delegate, &mut out).unwrap();

    assert_eq!(
        String::from_utf8(out).unwrap(),
        format!("{CLASS_COUNT_MISMATCH_MESSAGE}\n")
    );
    assert_eq!(
        CLASS_COUNT_MISMATCH_MESSAGE,
        "Number of class names does not match number of classes!"
    );
    assert_eq!(delegate.test.len(), 1);
}

#[test]
fn matching_class_names_write_nothing() {
    let config = TestConfig::load(write_config(TEST).path()).unwrap();
    let mut delegate = RecordingDelegate::default();
    let mut out = Vec::new();

    run_test_with_output(&config, MismatchPolicy::Warn, &mut delegate, &mut out).unwrap();

    assert!(out.is_empty());
}

#[test]
fn test_with_class_mismatch_stops_when_aborting() {
    let file = write_config(&TEST.replace("num_classes = 3", "num_classes = 2"));
    let mut delegate = RecordingDelegate::default();

    let result = test_from_file(file.path(), MismatchPolicy::Abort, &mut delegate);

    assert!(matches!(
        result,
        Err(RunError::Config(ConfigError::ClassCountMismatch {
            names: 3,
            classes: 2
        }))
    ));
    assert_eq!(delegate.calls(), 0);
}

#[test]
fn inference_maps_model_path_to_input_model_path() {
    let file = write_config(INFERENCE);
    let mut delegate = RecordingDelegate::default();

    inference_from_file(file.path(), &mut delegate).unwrap();

    assert_eq!(
        delegate.infer,
        vec![InferArgs {
            data_dir: PathBuf::from("/data/dop20/new"),
            input_model_path: PathBuf::from("/models/upernet_v1"),
            num_classes: 3,
            output_path: PathBuf::from("/results/predictions"),
        }]
    );
}

#[test]
fn library_errors_propagate_unchanged() {
    struct FailingDelegate;

    impl SegmentationDelegate for FailingDelegate {
        fn train(&mut self, _: &TrainArgs) -> Result<(), DelegateError> {
            Err(DelegateError::Spawn {
                program: "python3".to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        fn test(&mut self, _: &TestArgs) -> Result<(), DelegateError> {
            unreachable!("only train is exercised")
        }

        fn infer(&mut self, _: &InferArgs) -> Result<(), DelegateError> {
            unreachable!("only train is exercised")
        }
    }

    let file = write_config(TRAIN);
    let result = train_from_file(file.path(), &mut FailingDelegate);

    match result {
        Err(RunError::Delegate(DelegateError::Spawn { program, .. })) => {
            assert_eq!(program, "python3");
        }
        other => panic!("Expected Spawn error, got {other:?}"),
    }
}

#[test]
fn bundled_sample_configs_load() {
    use geonn::config::{InferenceConfig, TrainConfig};

    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../configs");

    let train = TrainConfig::load(dir.join("train.ini")).unwrap();
    assert_eq!(train.input_model_path, None);
    assert_eq!(train.output_train_metrics_path, None);

    let test = TestConfig::load(dir.join("test.ini")).unwrap();
    assert_eq!(test.class_names.len(), test.num_classes as usize);

    InferenceConfig::load(dir.join("inference.ini")).unwrap();
}

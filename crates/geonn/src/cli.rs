//! Shared plumbing for the `train_smp`, `test_smp` and `inference_smp` binaries.

use std::process::ExitCode;

use crate::run::RunError;

/// Turns the outcome of a front-end run into the process exit code.
///
/// Errors are printed to stderr with their full cause chain.
pub fn finish(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(failure_code(&err))
        }
    }
}

/// Exit code for a failed run.
///
/// When the segmentation library exited with a non-zero code, that code is
/// passed through; any other failure maps to 1.
pub fn failure_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<RunError>()
        .and_then(RunError::exit_code)
        .and_then(|code| u8::try_from(code).ok())
        .filter(|&code| code != 0)
        .unwrap_or(1)
}

//! Runs the library functions in a Python child process.
//!
//! The child imports `geo_neural_network.smp_lib.<module>`, reads a JSON
//! object of keyword arguments from stdin and calls the function with it.
//! JSON `null` arrives as Python `None`. stdout and stderr are inherited so
//! the library's own progress output reaches the terminal unchanged.

use std::{
    env,
    ffi::OsString,
    io::Write,
    process::{Command, Stdio},
};

use serde::Serialize;

use crate::delegate::{DelegateError, InferArgs, SegmentationDelegate, TestArgs, TrainArgs};

/// Environment variable naming the Python interpreter.
pub const PYTHON_ENV: &str = "GEONN_PYTHON";

/// Interpreter used when [`PYTHON_ENV`] is unset.
pub const DEFAULT_PYTHON: &str = "python3";

const LIBRARY_PACKAGE: &str = "geo_neural_network.smp_lib";

/// A function exported by the segmentation library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LibraryFunction {
    Train,
    Test,
    Inference,
}

impl LibraryFunction {
    /// Module under `geo_neural_network.smp_lib` that defines the function.
    pub const fn module(self) -> &'static str {
        match self {
            Self::Train => "smp_train",
            Self::Test => "smp_test",
            Self::Inference => "smp_inference",
        }
    }

    /// Name of the function inside its module.
    pub const fn function(self) -> &'static str {
        // Each module exports a function of the same name.
        self.module()
    }

    /// Python source that imports the function and calls it with keyword
    /// arguments decoded from stdin.
    pub fn bootstrap(self) -> String {
        format!(
            "import json, sys\n\
             from {LIBRARY_PACKAGE}.{module} import {function}\n\
             {function}(**json.load(sys.stdin))\n",
            module = self.module(),
            function = self.function(),
        )
    }
}

/// Production delegate: one Python process per library call.
#[derive(Debug, Clone)]
pub struct PythonDelegate {
    interpreter: OsString,
}

impl PythonDelegate {
    /// Uses `interpreter` to run the library.
    pub fn new(interpreter: impl Into<OsString>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }

    /// Uses the interpreter named by `GEONN_PYTHON`, or `python3`.
    pub fn from_env() -> Self {
        Self::new(env::var_os(PYTHON_ENV).unwrap_or_else(|| DEFAULT_PYTHON.into()))
    }

    fn call<T: Serialize>(&self, target: LibraryFunction, args: &T) -> Result<(), DelegateError> {
        let function = target.function();
        let payload = serde_json::to_vec(args)
            .map_err(|source| DelegateError::Payload { function, source })?;
        let program = self.interpreter.to_string_lossy().into_owned();

        tracing::info!(
            interpreter = %program,
            module = %format!("{LIBRARY_PACKAGE}.{}", target.module()),
            function,
            "calling segmentation library",
        );

        let mut child = Command::new(&self.interpreter)
            .arg("-c")
            .arg(target.bootstrap())
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| DelegateError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Dropping the handle closes the pipe so `json.load` sees EOF.
        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(&payload),
            None => Ok(()),
        };

        let status = child.wait().map_err(|source| DelegateError::Spawn {
            program: program.clone(),
            source,
        })?;
        if !status.success() {
            return Err(DelegateError::Failed { function, status });
        }
        written.map_err(|source| DelegateError::Stdin { function, source })?;

        tracing::info!(function, "segmentation library finished");
        Ok(())
    }
}

impl Default for PythonDelegate {
    fn default() -> Self {
        Self::from_env()
    }
}

impl SegmentationDelegate for PythonDelegate {
    fn train(&mut self, args: &TrainArgs) -> Result<(), DelegateError> {
        self.call(LibraryFunction::Train, args)
    }

    fn test(&mut self, args: &TestArgs) -> Result<(), DelegateError> {
        self.call(LibraryFunction::Test, args)
    }

    fn infer(&mut self, args: &InferArgs) -> Result<(), DelegateError> {
        self.call(LibraryFunction::Inference, args)
    }
}

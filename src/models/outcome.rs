//! Outcome models for test execution
//!
//! Defines unit-level and method-level outcomes and the captured check error.

use serde::Serialize;
use std::any::Any;
use std::fmt;
use thiserror::Error;

/// Overall outcome of one test unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Succeeded,
    Failed,
    Skipped,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Succeeded => write!(f, "succeeded"),
            Outcome::Failed => write!(f, "failed"),
            Outcome::Skipped => write!(f, "skipped"),
        }
    }
}

/// Outcome of a single check method
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MethodOutcome {
    Succeeded,
    /// Not attempted because an earlier sibling failed under fail-fast
    Skipped,
    Failed(CheckError),
}

impl MethodOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, MethodOutcome::Failed(_))
    }
}

/// Error captured from a failed check method
///
/// The optional stack is pre-rendered text in the harness trace format: an
/// error header line (`Kind: message`) followed by `at ...` call frames.
#[derive(Clone, Debug, Error, Serialize)]
#[error("{message}")]
pub struct CheckError {
    message: String,
    stack: Option<String>,
}

impl CheckError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            stack: None,
        }
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// Capture a panic payload from a check method
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(text) = payload.downcast_ref::<&str>() {
            (*text).to_string()
        } else if let Some(text) = payload.downcast_ref::<String>() {
            text.clone()
        } else {
            "check method panicked".to_string()
        };
        Self::new(message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn stack(&self) -> Option<&str> {
        self.stack.as_deref()
    }
}

impl From<anyhow::Error> for CheckError {
    fn from(error: anyhow::Error) -> Self {
        // keep the stack of errors produced by the context's own helpers
        match error.downcast::<CheckError>() {
            Ok(check) => check,
            Err(other) => Self::new(format!("{other:#}")),
        }
    }
}

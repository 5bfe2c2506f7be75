use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The single failure kind of the command boundary. The reason is opaque and
/// surfaces verbatim wherever the failure is shown.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{reason}")]
pub struct OperationFailed {
    pub reason: String,
}

impl OperationFailed {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl From<String> for OperationFailed {
    fn from(reason: String) -> Self {
        Self { reason }
    }
}

impl From<&str> for OperationFailed {
    fn from(reason: &str) -> Self {
        Self::new(reason)
    }
}

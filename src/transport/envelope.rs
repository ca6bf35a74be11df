use crate::core::decode::Operation;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use serde::{Deserialize, Serialize};

/// One transport-level record carrying a decoded operation, a completion
/// signal, or a terminal error across the process boundary.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    Operation { operation: Operation },
    Complete,
    Error { message: String },
}

impl Envelope {
    pub fn operation(operation: Operation) -> Self {
        Envelope::Operation { operation }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::Error {
            message: message.into(),
        }
    }

    /// Serialize as one self-contained, newline-terminated wire record.
    pub fn to_line(&self) -> Result<String, AppError> {
        let mut line = serde_json::to_string(self).map_err(|err| {
            AppError::new(
                ErrorCategory::SerializationError,
                format!("failed to encode envelope: {}", err),
            )
        })?;
        line.push('\n');
        Ok(line)
    }
}

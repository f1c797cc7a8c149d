use thiserror::Error;

/// Domain-level errors raised before any warehouse query is issued.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A filter was constructed with invalid values. `field` names the
    /// offending filter axis so callers can point at the right widget.
    #[error("Validation failed for {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
}

impl CoreError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        CoreError::Validation {
            field,
            message: message.into(),
        }
    }

    /// The filter axis this error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            CoreError::Validation { field, .. } => field,
        }
    }
}

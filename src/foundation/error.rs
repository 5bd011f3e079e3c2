/// Convenience result type used across the SDK.
pub type AvStudioResult<T> = Result<T, AvStudioError>;

/// Top-level error taxonomy used by the scene model and the service clients.
#[derive(thiserror::Error, Debug)]
pub enum AvStudioError {
    /// Malformed or unexpected JSON handed to a deserializer.
    #[error("schema error: {0}")]
    Schema(String),

    /// Positional access past the end of a sequence.
    #[error("index error: index {index} out of range (len {len})")]
    Index {
        /// Requested position.
        index: usize,
        /// Length of the sequence at the time of access.
        len: usize,
    },

    /// A value that could not be coerced to the required numeric type.
    #[error("type conversion error: {0}")]
    TypeConversion(String),

    /// Invalid model state or caller-provided data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Errors when serializing data structures to JSON.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Non-success response or I/O failure on the service channel.
    #[error("transport error{}: {message}", status_suffix(.status))]
    Transport {
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Human-readable description.
        message: String,
    },

    /// A lookup on the service did not find the requested entity.
    #[error("not found: {0}")]
    NotFound(String),

    /// Missing or invalid client configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AvStudioError {
    /// Build a [`AvStudioError::Schema`] value.
    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    /// Build a [`AvStudioError::Index`] value.
    pub fn index(index: usize, len: usize) -> Self {
        Self::Index { index, len }
    }

    /// Build a [`AvStudioError::TypeConversion`] value.
    pub fn type_conversion(msg: impl Into<String>) -> Self {
        Self::TypeConversion(msg.into())
    }

    /// Build a [`AvStudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`AvStudioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Build a [`AvStudioError::Transport`] value without a status code.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport {
            status: None,
            message: msg.into(),
        }
    }

    /// Build a [`AvStudioError::Transport`] value for an HTTP status.
    pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
        Self::Transport {
            status: Some(status),
            message: msg.into(),
        }
    }

    /// Build a [`AvStudioError::NotFound`] value.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Build a [`AvStudioError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {s})")).unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

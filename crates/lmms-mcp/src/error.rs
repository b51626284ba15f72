//! Errors surfaced to MCP clients.

use lmms_project::{DecodeError, EncodeError, ModelError};
use thiserror::Error;

/// Anything a tool can fail with. The `Display` text is what the client sees
/// after the `Error:` prefix.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Command(String),
}

impl ToolError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        ToolError::Io {
            context: context.into(),
            source,
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        ToolError::Invalid(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_errors_keep_their_message() {
        let err = ToolError::from(ModelError::TrackNotFound(3));
        assert_eq!(err.to_string(), "track 3 not found");
    }

    #[test]
    fn io_errors_carry_context() {
        let err = ToolError::io(
            "reading song.mmp",
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        );
        assert_eq!(err.to_string(), "reading song.mmp: missing");
    }
}

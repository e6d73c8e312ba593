//! Error types for the Stratum codec.

use std::error::Error as StdError;

use thiserror::Error;

/// Broad classes of codec failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Structural or type mismatch in a wire message.
    Parse,
    /// Hex decoding or header reconstruction failure.
    Decode,
    /// Any other failure, such as an unknown miner model.
    Other,
}

/// A codec failure.
///
/// The description names the offending field or input; the original cause,
/// when there is one, is preserved for `source()` chaining.
#[derive(Debug, Error)]
#[error("{description}")]
pub struct ProtocolError {
    pub kind: ErrorKind,
    pub description: String,
    #[source]
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

/// Convenient Result type for codec operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

impl ProtocolError {
    fn new(
        kind: ErrorKind,
        description: impl Into<String>,
        source: Option<Box<dyn StdError + Send + Sync>>,
    ) -> Self {
        Self {
            kind,
            description: description.into(),
            source,
        }
    }

    pub fn parse(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, description, None)
    }

    pub fn parse_with(
        description: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::new(ErrorKind::Parse, description, Some(Box::new(source)))
    }

    pub fn decode(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Decode, description, None)
    }

    pub fn decode_with(
        description: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::new(ErrorKind::Decode, description, Some(Box::new(source)))
    }

    pub fn other(description: impl Into<String>) -> Self {
        Self::new(ErrorKind::Other, description, None)
    }

    pub fn other_with(
        description: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::new(ErrorKind::Other, description, Some(Box::new(source)))
    }
}

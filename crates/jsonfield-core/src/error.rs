use crate::{codec::CodecError, config::ConfigError, path::PathError, schema::IndexSpecError};
use std::fmt;
use thiserror::Error as ThisError;

///
/// Error
///
/// Crate-level error surfaced to the host ORM.
/// Each variant wraps the component error that produced it; nothing is
/// retried or repaired internally.
///

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("invalid path: {0}")]
    InvalidPath(#[from] PathError),

    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("invalid index spec: {0}")]
    InvalidIndexSpec(#[from] IndexSpecError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::InvalidPath(_) | Self::InvalidIndexSpec(_) | Self::Config(_) => {
                ErrorClass::InvalidInput
            }
            Self::Codec(CodecError::Serialize { .. }) => ErrorClass::Unsupported,
            Self::Codec(CodecError::Deserialize { .. }) => ErrorClass::Corruption,
        }
    }

    #[must_use]
    pub const fn origin(&self) -> ErrorOrigin {
        match self {
            Self::InvalidPath(_) => ErrorOrigin::Path,
            Self::Codec(_) => ErrorOrigin::Codec,
            Self::InvalidIndexSpec(_) => ErrorOrigin::Schema,
            Self::Config(_) => ErrorOrigin::Field,
        }
    }

    /// Whether the stored column text failed to decode.
    #[must_use]
    pub const fn is_corruption(&self) -> bool {
        matches!(self.class(), ErrorClass::Corruption)
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin(), self.class(), self)
    }
}

///
/// ErrorClass
/// Stable error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidInput,
    Unsupported,
    Corruption,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidInput => "invalid_input",
            Self::Unsupported => "unsupported",
            Self::Corruption => "corruption",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Path,
    Codec,
    Schema,
    Field,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Path => "path",
            Self::Codec => "codec",
            Self::Schema => "schema",
            Self::Field => "field",
        };
        write!(f, "{label}")
    }
}

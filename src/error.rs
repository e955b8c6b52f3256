//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Every pipeline stage fails fast with one of the variants below; [`Error::kind`]
//! gives the coarse, serializable classification used by the CLI exit codes and the
//! service's JSON error payload.
use serde::Serialize;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Cannot decode input image: {0}")]
    Decode(String),

    #[error("Invalid parameter: {arg}={value} ({reason})")]
    InvalidParameter {
        arg: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("Foreground not found at white threshold {threshold} (try lowering the threshold)")]
    NoSubjectDetected { threshold: u8 },

    #[error(
        "Desired height {desired} is smaller than the padded subject height {padded}; the subject is never shrunk"
    )]
    InvalidTargetHeight { desired: usize, padded: usize },

    #[error("Cannot encode output image: {0}")]
    Encode(String),

    #[error("Resource error: {0}")]
    Resource(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse error classification shared by every invocation boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ErrorKind {
    DecodeError,
    InvalidParameter,
    NoSubjectDetected,
    InvalidTargetHeight,
    EncodeError,
    ResourceError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::DecodeError => "DecodeError",
            ErrorKind::InvalidParameter => "InvalidParameter",
            ErrorKind::NoSubjectDetected => "NoSubjectDetected",
            ErrorKind::InvalidTargetHeight => "InvalidTargetHeight",
            ErrorKind::EncodeError => "EncodeError",
            ErrorKind::ResourceError => "ResourceError",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Error {
    pub fn decode<E: std::fmt::Display>(e: E) -> Self {
        Error::Decode(e.to_string())
    }

    pub fn encode<E: std::fmt::Display>(e: E) -> Self {
        Error::Encode(e.to_string())
    }

    pub fn resource<E: std::fmt::Display>(e: E) -> Self {
        Error::Resource(e.to_string())
    }

    pub fn invalid(arg: &'static str, value: impl ToString, reason: &'static str) -> Self {
        Error::InvalidParameter {
            arg,
            value: value.to_string(),
            reason,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Decode(_) => ErrorKind::DecodeError,
            Error::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Error::NoSubjectDetected { .. } => ErrorKind::NoSubjectDetected,
            Error::InvalidTargetHeight { .. } => ErrorKind::InvalidTargetHeight,
            Error::Encode(_) => ErrorKind::EncodeError,
            Error::Resource(_) | Error::Io(_) => ErrorKind::ResourceError,
        }
    }
}

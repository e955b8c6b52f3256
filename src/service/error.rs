use thiserror::Error;

use crate::error::{Error, ErrorKind};

/// Failures visible at the HTTP boundary.
///
/// Pipeline failures keep their [`ErrorKind`]; the service adds the ones only a
/// network wrapper can produce.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Pipeline(#[from] Error),

    #[error("Malformed request: {0}")]
    BadRequest(String),

    #[error("Request body exceeds the {limit}-byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Cannot fetch image: {0}")]
    Download(String),

    #[error("Request did not finish within {0} s")]
    Timeout(u64),

    #[error("Client did not send a complete request within {0} s")]
    RequestTimeout(u64),

    #[error("No route for {0}")]
    NotFound(String),

    #[error("Method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("Invalid service configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Stable discriminant sent as `error.kind` in JSON responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ServiceError::Pipeline(e) => e.kind().as_str(),
            ServiceError::BadRequest(_) | ServiceError::PayloadTooLarge { .. } => {
                ErrorKind::InvalidParameter.as_str()
            }
            ServiceError::Download(_) | ServiceError::Config(_) | ServiceError::Io(_) => {
                ErrorKind::ResourceError.as_str()
            }
            ServiceError::Timeout(_) | ServiceError::RequestTimeout(_) => "Timeout",
            ServiceError::NotFound(_) => "NotFound",
            ServiceError::MethodNotAllowed { .. } => "MethodNotAllowed",
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Pipeline(e) => match e.kind() {
                ErrorKind::InvalidParameter => 400,
                ErrorKind::NoSubjectDetected | ErrorKind::InvalidTargetHeight => 422,
                ErrorKind::DecodeError | ErrorKind::EncodeError | ErrorKind::ResourceError => 500,
            },
            ServiceError::BadRequest(_) => 400,
            ServiceError::PayloadTooLarge { .. } => 413,
            ServiceError::Download(_) | ServiceError::Config(_) | ServiceError::Io(_) => 500,
            ServiceError::Timeout(_) => 504,
            ServiceError::RequestTimeout(_) => 408,
            ServiceError::NotFound(_) => 404,
            ServiceError::MethodNotAllowed { .. } => 405,
        }
    }
}

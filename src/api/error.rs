use thiserror::Error;

use crate::api::types::ErrorBody;

/// Message shown for every failure that did not come from the server itself.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Une erreur inconnue est survenue";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("connection failed: {0}")]
    Connect(String),
    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// Rejected before anything was sent.
    #[error("{0}")]
    Invalid(String),
    /// Missing or malformed field reported by the server with a 400.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("HTTP error! status: {0}")]
    UnexpectedStatus(u16),
    #[error("{}", UNKNOWN_ERROR_MESSAGE)]
    Transport(#[source] TransportError),
    #[error("{}", UNKNOWN_ERROR_MESSAGE)]
    MalformedBody(#[source] serde_json::Error),
}

impl ApiError {
    /// Maps a non-success response onto the taxonomy, using the body's `error` field when present.
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let message = match serde_json::from_slice::<ErrorBody>(body) {
            Ok(v) if !v.error.trim().is_empty() => v.error,
            _ => return ApiError::UnexpectedStatus(status),
        };

        match status {
            400 | 422 => ApiError::Validation(message),
            401 | 403 => ApiError::Auth(message),
            404 => ApiError::NotFound(message),
            409 => ApiError::Conflict(message),
            _ => ApiError::Server { status, message },
        }
    }

    /// True for failures the server never got to describe.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::Transport(_) | ApiError::MalformedBody(_) | ApiError::UnexpectedStatus(_)
        )
    }

    /// True when the request never left the client.
    pub fn is_preflight(&self) -> bool {
        matches!(self, ApiError::Invalid(_))
    }

    /// The text rendered inline next to the form or view that triggered the call.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<TransportError> for ApiError {
    fn from(e: TransportError) -> Self {
        ApiError::Transport(e)
    }
}

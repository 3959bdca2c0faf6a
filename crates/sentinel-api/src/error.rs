use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or expired bearer token.  Callers must tear the session
    /// down and re-authenticate; this is never retried.
    #[error("Session expired or unauthorized")]
    Unauthorized,

    #[error("Server responded {0}")]
    Status(reqwest::StatusCode),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

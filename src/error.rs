use thiserror::Error;

/// Failure taxonomy for the backend boundary.
///
/// Everything here is recovered locally: handlers and the CLI turn these into
/// notifications, nothing propagates past the boundary.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),
    /// 2xx transport but a non-success business code in the envelope.
    #[error("{msg}")]
    Remote { code: i32, msg: String },
    #[error("session expired, please sign in again")]
    SessionExpired,
    #[error("access denied (403)")]
    Forbidden,
    #[error("server internal error")]
    ServerError,
    #[error("network error: {0}")]
    Transport(String),
    /// Local snapshot file IO, never the network.
    #[error("storage error: {0}")]
    Storage(String),
    #[error("unexpected response payload: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Malformed(err.to_string())
    }
}

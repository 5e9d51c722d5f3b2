use engine::EngineError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

/// Failures talking to the record store or the identity provider.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No active session: entry data and mutations are not available.
    #[error("not signed in")]
    Unauthenticated,
    /// Sign-in/sign-up rejected; carries the provider's readable message.
    #[error("{0}")]
    Auth(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("rejected by the store: {0}")]
    Validation(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("invalid base_url: {0}")]
    InvalidUrl(String),
    #[error("invalid record #{id}: {source}")]
    InvalidRecord { id: i64, source: EngineError },
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("http error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Maps an HTTP failure status to an error, keeping the body's message.
    pub(crate) fn from_status(status: u16, message: String) -> Self {
        match status {
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict(message),
            400 | 422 => Self::Validation(message),
            _ => Self::Server(message),
        }
    }
}

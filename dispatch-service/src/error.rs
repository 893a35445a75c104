use thiserror::Error;

pub type Result<T> = std::result::Result<T, DispatchError>;

/// Failures surfaced by the dispatch pipeline's collaborators.
///
/// None of these escape [`crate::dispatcher::BatchDispatcher::run_batch`];
/// they end the unit of work they occur in and are logged there.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid batch request: {0}")]
    Validation(String),

    #[error("{kind} not found: {key}")]
    NotFound { kind: &'static str, key: String },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("provider returned HTTP {0}")]
    NonSuccess(u16),

    #[error("persistence failure: {0}")]
    Persistence(String),

    #[error("configuration lookup failed: {0}")]
    Configuration(String),
}

impl DispatchError {
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(error: reqwest::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<tokio_postgres::Error> for DispatchError {
    fn from(error: tokio_postgres::Error) -> Self {
        Self::Persistence(error.to_string())
    }
}

use sportsync_provider::ProviderError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Db(#[from] sqlx::Error),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("unknown job key: {0}")]
    UnknownJobKey(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

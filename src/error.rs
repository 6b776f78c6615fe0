pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Sync + Send + 'static>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid zenoh configuration: {0}")]
    Config(String),

    #[error("Location status API unavailable: {0}")]
    Unavailable(&'static str),

    #[error("Location query failed: {0}")]
    Provider(&'static str),
}

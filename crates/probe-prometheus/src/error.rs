use thiserror::Error;

#[derive(Debug, Error)]
pub enum PromError {
    #[error("metric registration failed: {0}")]
    Registry(#[from] prometheus::Error),
    #[error("http client: {0}")]
    Client(String),
    #[error("encoding failed: {0}")]
    Encode(String),
}

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown task status: {0}")]
    UnknownStatus(String),
    #[error("unknown task step: {0}")]
    UnknownStep(String),
    #[error("unknown metric series: {0}")]
    UnknownSeries(String),
}

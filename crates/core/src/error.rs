use thiserror::Error;

pub type MetricsResult<T> = Result<T, MetricsError>;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Fixture generation error: {0}")]
    Generation(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

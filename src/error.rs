use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeclockError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Configuration is locked while a test is running")]
    SessionRunning,

    #[error("Word list '{0}' is empty")]
    EmptyWordList(String),
}

pub type TcResult<T> = Result<T, TypeclockError>;

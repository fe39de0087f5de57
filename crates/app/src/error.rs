use engine::EngineError;
use store_client::ClientError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("backend error: {0}")]
    Client(#[from] ClientError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl AppError {
    /// Process exit code: 2 for validation failures, 3 for missing records.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Engine(err) if err.is_validation() => 2,
            Self::Engine(err) if err.is_not_found() => 3,
            _ => 1,
        }
    }
}

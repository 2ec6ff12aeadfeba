use thiserror::Error;

pub type CheckerResult<T> = Result<T, CheckerError>;

#[derive(Error, Debug)]
pub enum CheckerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to open workbook: {0}")]
    WorkbookOpen(String),

    #[error("Failed to save workbook: {0}")]
    WorkbookSave(String),

    #[error("Sheet handle is stale: {0}")]
    SheetNotFound(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

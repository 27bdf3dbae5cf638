use thiserror::Error;

#[derive(Error, Debug)]
pub enum RegfishError {
    #[error("No table id in file name: {0}")]
    TableId(String),

    #[error("Invalid summary value: {0}")]
    Summary(String),

    #[error("Malformed index line {line}: {reason}")]
    IndexLine { line: u64, reason: String },

    #[error("Malformed player line {line}: {reason}")]
    PlayerLine { line: u64, reason: String },

    #[error("No index in result folder, run index first: {0}")]
    MissingStore(String),

    #[error("Invalid checkpoint: {0}")]
    Checkpoint(String),

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Cannot parse interval: {0}")]
    Interval(String),

    #[error("Invalid calculation mode: {0}")]
    CalcMode(String),

    #[error("Invalid prize pool multiplier: {0}")]
    Multiplier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

pub type Result<T> = std::result::Result<T, RegfishError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeySolveError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed layout file.
    #[error("Layout Format Error: {0}")]
    Format(String),

    /// Malformed weight string, unknown metric or metric set.
    #[error("Parse Error: {0}")]
    Parse(String),

    /// Invalid optimiser configuration (schedule name, generation count).
    #[error("Configuration Error: {0}")]
    Config(String),
}

pub type KsResult<T> = Result<T, KeySolveError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoderError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Data Validation Error: {0}")]
    Validation(String),

    #[error("Proximity table has {actual} entries, expected {expected} (grid cells x per-cell capacity)")]
    ProximityTableSize { expected: usize, actual: usize },

    #[error("Layout has {count} keys, at most {max} are supported")]
    TooManyKeys { count: usize, max: usize },

    #[error("Capacity exceeded: {what} holds at most {capacity} entries")]
    Capacity { what: &'static str, capacity: usize },

    #[error("Malformed input trace: {0}")]
    TraceShape(String),
}

pub type DgResult<T> = Result<T, DecoderError>;

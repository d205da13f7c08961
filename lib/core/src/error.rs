use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension { expected: usize, actual: usize },

    #[error("Axis {axis} out of range for {dim}-dimensional shape")]
    AxisOutOfRange { axis: usize, dim: usize },

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Duplicate record id: {0}")]
    DuplicateRecord(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IsoError {
    #[error("Path is empty after normalization")]
    EmptyPath,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Duplicate path: {0}")]
    DuplicatePath(String),

    #[error("Name too long: '{name}' is {len} bytes, maximum is {max}")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("Directory '{directory}' needs {required} bytes of records, sector holds {capacity}")]
    DirectorySectorOverflow {
        directory: String,
        required: usize,
        capacity: usize,
    },

    #[error("Unsupported file size: {path} ({size} bytes)")]
    UnsupportedFileSize { path: String, size: u64 },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, IsoError>;

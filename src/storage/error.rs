use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to create storage directory {path}: {source}", path = path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to list storage directory {path}: {source}", path = path.display())]
    ListDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write story file {path}: {source}", path = path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read story file {path}: {source}", path = path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete story file {path}: {source}", path = path.display())]
    Delete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize story: {0}")]
    Serialize(serde_json::Error),
    #[error("failed to deserialize story: {0}")]
    Deserialize(serde_json::Error),
    #[error("invalid story file name: {0}")]
    InvalidFilename(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Photo not found: {0}")]
    PhotoNotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Blob store error: {0}")]
    Blob(String),

    #[error("Record store error: {0}")]
    Record(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("No authenticated administrative session")]
    Unauthenticated,

    #[error("A sync is already running for this session")]
    SyncInProgress,

    /// The first failure of a sync walk. Everything applied before it stays applied.
    #[error("Sync failed at position {position} ({path}): {source}")]
    SyncFailed {
        position: usize,
        path: String,
        #[source]
        source: Box<PhotoError>,
    },

    #[error("Config error: {0}")]
    Config(String),
}

impl PhotoError {
    pub fn sync_failed(position: usize, path: impl Into<String>, source: PhotoError) -> Self {
        PhotoError::SyncFailed {
            position,
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl From<confique::Error> for PhotoError {
    fn from(err: confique::Error) -> Self {
        PhotoError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PhotoError>;

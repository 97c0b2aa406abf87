use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = StickerError> = std::result::Result<T, E>;

/// Boxed error returned by attachment fetchers
pub type FetchSource = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum StickerError {
    /// The persisted document is not a valid sticker map
    #[error("failed to parse sticker data: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("failed to serialize sticker data: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("{action} {path}: {source}", path = .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to download {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: FetchSource,
    },

    #[error("sticker '{0}' already exists")]
    AlreadyExists(String),

    #[error("sticker '{0}' not found")]
    NotFound(String),
}

impl StickerError {
    /// Wraps an I/O failure with the path it happened on
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StickerError::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

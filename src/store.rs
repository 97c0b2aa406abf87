use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use chrono::{DateTime, Local};
use derive_more::Deref;
use serenity::prelude::TypeMapKey;
use tokio::sync::RwLock;
use tracing::*;
use crate::codec;
use crate::error::{Result, StickerError};
use crate::sticker::{Sticker, StickerMap};

pub const STICKER_FILE: &str = "stickers.json";
pub const RESOURCES_DIR: &str = "resources";

/// Shared handle to the one registry of this process
#[derive(Clone, Debug, Deref)]
pub struct RegistryHandle(pub Arc<StickerRegistry>);

impl TypeMapKey for RegistryHandle {
    type Value = RegistryHandle;
}

impl RegistryHandle {
    /// True when both handles point at the same registry
    pub fn same_registry(&self, other: &RegistryHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Size and modification time of the persistence file
#[derive(Clone, Debug)]
pub struct FileStatus {
    pub size: u64,
    pub modified: Option<DateTime<Local>>,
}

/// File-backed map of stickers
///
/// Every mutation persists the whole map while still holding the write lock,
/// so readers never see a change that has not been handed to the file.
#[derive(Debug)]
pub struct StickerRegistry {
    stickers: RwLock<StickerMap>,
    root: PathBuf,
    file_path: PathBuf,
}

impl StickerRegistry {
    /// Creates an empty registry persisting to `<root>/stickers.json`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        StickerRegistry {
            stickers: RwLock::new(StickerMap::new()),
            file_path: root.join(STICKER_FILE),
            root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn resources_dir(&self) -> PathBuf {
        self.root.join(RESOURCES_DIR)
    }

    /// Replaces the in-memory map with the persisted one
    ///
    /// A missing or blank file is a first run and leaves the map empty. On a
    /// decode failure the map is also left empty.
    pub async fn load(&self) -> Result<usize> {
        let mut stickers = self.stickers.write().await;
        stickers.clear();
        *stickers = self.read_file().await?;
        info!("loaded {} stickers", stickers.len());
        Ok(stickers.len())
    }

    /// Loads again from disk, returning the counts before and after
    ///
    /// Unlike [`load`](Self::load), a file that cannot be read or decoded
    /// leaves the current stickers in place.
    pub async fn reload(&self) -> Result<(usize, usize)> {
        let mut stickers = self.stickers.write().await;
        let previous = stickers.len();
        *stickers = self.read_file().await?;
        info!("reloaded {} stickers, previously {previous}", stickers.len());
        Ok((previous, stickers.len()))
    }

    /// Reads and decodes the persistence file without touching memory
    async fn read_file(&self) -> Result<StickerMap> {
        let data = match tokio::fs::read(&self.file_path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("sticker file does not exist, will create new file: {}", self.file_path.display());
                return Ok(StickerMap::new());
            }
            Err(e) => return Err(StickerError::io("failed to read", &self.file_path, e)),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            info!("sticker file is empty: {}", self.file_path.display());
            return Ok(StickerMap::new());
        }
        codec::decode(&data)
    }

    /// Writes the current map to disk
    pub async fn save(&self) -> Result<()> {
        let stickers = self.stickers.write().await;
        self.persist(&stickers).await
    }

    /// Writes a map the caller already holds the lock for
    async fn persist(&self, stickers: &StickerMap) -> Result<()> {
        let data = codec::encode(stickers)?;
        tokio::fs::write(&self.file_path, data)
            .await
            .map_err(|e| StickerError::io("failed to save sticker file", &self.file_path, e))?;
        debug!("saved {} stickers", stickers.len());
        Ok(())
    }

    /// Inserts a sticker whose name is not taken yet
    ///
    /// The name is used verbatim as the key and is not validated; callers
    /// are expected to pass a non-empty name.
    pub async fn add(&self, sticker: Sticker) -> Result<()> {
        let mut stickers = self.stickers.write().await;
        if stickers.contains_key(&sticker.name) {
            return Err(StickerError::AlreadyExists(sticker.name));
        }

        let name = sticker.name.clone();
        stickers.insert(name.clone(), sticker);
        self.persist(&stickers).await?;

        info!("added sticker: {name}");
        Ok(())
    }

    /// Inserts or replaces a sticker by name, returning the replaced one
    pub async fn upsert(&self, sticker: Sticker) -> Result<Option<Sticker>> {
        let mut stickers = self.stickers.write().await;
        let name = sticker.name.clone();
        let previous = stickers.insert(name.clone(), sticker);
        self.persist(&stickers).await?;

        if previous.is_some() {
            info!("replaced sticker: {name}");
        } else {
            info!("added sticker: {name}");
        }
        Ok(previous)
    }

    pub async fn get(&self, name: &str) -> Result<Sticker> {
        self.stickers
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StickerError::NotFound(name.to_string()))
    }

    /// Snapshot of every sticker, in no particular order
    pub async fn list(&self) -> Vec<Sticker> {
        self.stickers.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.stickers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.stickers.read().await.is_empty()
    }

    /// Removes a sticker, returning it
    pub async fn delete(&self, name: &str) -> Result<Sticker> {
        let mut stickers = self.stickers.write().await;
        let removed = stickers
            .remove(name)
            .ok_or_else(|| StickerError::NotFound(name.to_string()))?;
        self.persist(&stickers).await?;

        info!("deleted sticker: {name}");
        Ok(removed)
    }

    /// Metadata of the persistence file, `None` when it does not exist
    pub async fn file_status(&self) -> Result<Option<FileStatus>> {
        match tokio::fs::metadata(&self.file_path).await {
            Ok(meta) => Ok(Some(FileStatus {
                size: meta.len(),
                modified: meta.modified().ok().map(DateTime::<Local>::from),
            })),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StickerError::io("failed to inspect", &self.file_path, e)),
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::*;
use crate::error::{Result, StickerError};
use crate::store::{RegistryHandle, StickerRegistry};

/// Builds and loads the sticker registry once, no matter how many callers ask
///
/// Late callers wait for the first caller's load to finish. A failed
/// initialization is not cached, so the next call tries again.
#[derive(Debug, Default)]
pub struct StickerGate {
    root: Option<PathBuf>,
    registry: OnceCell<RegistryHandle>,
}

impl StickerGate {
    /// Gate rooted at the working directory, resolved on first use
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate rooted at an explicit directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        StickerGate {
            root: Some(root.into()),
            registry: OnceCell::new(),
        }
    }

    /// Handle to the registry, initializing it on the first call
    pub async fn get_or_init(&self) -> Result<RegistryHandle> {
        self.registry
            .get_or_try_init(|| self.init())
            .await
            .cloned()
    }

    /// The registry if some caller already initialized it
    pub fn get(&self) -> Option<RegistryHandle> {
        self.registry.get().cloned()
    }

    async fn init(&self) -> Result<RegistryHandle> {
        let root = match &self.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()
                .map_err(|e| StickerError::io("failed to resolve", ".", e))?,
        };

        let registry = StickerRegistry::new(root);
        let resources = registry.resources_dir();
        tokio::fs::create_dir_all(&resources)
            .await
            .map_err(|e| StickerError::io("failed to create", &resources, e))?;
        if let Some(parent) = registry.file_path().parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StickerError::io("failed to create", parent, e))?;
        }

        if let Err(e) = registry.load().await {
            warn!("failed to load stickers, starting empty: {e}");
        }
        info!("sticker registry ready at {}", registry.file_path().display());

        Ok(RegistryHandle(Arc::new(registry)))
    }
}

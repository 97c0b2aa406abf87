//! Turning a remote attachment into a locally cached sticker.
//!
//! The download and the file write happen before the registry lock is taken;
//! only the final [`StickerRegistry::upsert`] serializes with other callers.

use std::path::Path;
use serenity::async_trait;
use tracing::*;
use crate::error::{FetchSource, Result, StickerError};
use crate::sticker::Sticker;
use crate::store::{StickerRegistry, RESOURCES_DIR};

/// Extension used when the uploaded file has none
pub const DEFAULT_EXTENSION: &str = ".png";

/// Stem used when nothing usable is left of the sticker name
const FALLBACK_STEM: &str = "sticker";

/// Something that can download the bytes behind a URL
#[async_trait]
pub trait AttachmentFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchSource>;
}

/// Fetches attachments over HTTP
#[derive(Clone, Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait]
impl AttachmentFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchSource> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}

/// An uploaded attachment to register under `name`
#[derive(Clone, Debug)]
pub struct UploadRequest<'a> {
    pub name: &'a str,
    pub source_url: &'a str,
    pub source_filename: &'a str,
    pub added_by: &'a str,
}

/// Reduces a sticker name to a single safe path component
pub fn sanitize_stem(name: &str) -> &str {
    name.split(['/', '\\'])
        .filter(|part| !part.is_empty() && *part != "." && *part != "..")
        .last()
        .unwrap_or(FALLBACK_STEM)
}

/// `.ext` of the uploaded filename, or [`DEFAULT_EXTENSION`]
pub fn extension_of(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

impl StickerRegistry {
    /// Downloads an attachment, caches it under the resource directory and
    /// registers it, replacing any sticker of the same name
    ///
    /// As with [`StickerRegistry::add`], the name is not validated; an empty
    /// name is stored under the key `""` with a `sticker` file stem.
    pub async fn ingest<F>(&self, fetcher: &F, request: UploadRequest<'_>) -> Result<Sticker>
    where
        F: AttachmentFetcher + ?Sized,
    {
        let bytes = fetcher
            .fetch(request.source_url)
            .await
            .map_err(|source| StickerError::Fetch {
                url: request.source_url.to_string(),
                source,
            })?;
        debug!("downloaded {} bytes from {}", bytes.len(), request.source_url);

        let filename = format!("{}{}", sanitize_stem(request.name), extension_of(request.source_filename));
        let path = self.resources_dir().join(&filename);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| StickerError::io("failed to save image", &path, e))?;

        let mut sticker = Sticker::new(request.name, request.source_url, request.added_by);
        sticker.local_path = Some(format!("{RESOURCES_DIR}/{filename}"));
        self.upsert(sticker.clone()).await?;

        info!("saved uploaded image for {} to {}", request.name, path.display());
        Ok(sticker)
    }
}

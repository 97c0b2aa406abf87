use std::collections::HashMap;
use std::sync::Mutex;
use chrono::DateTime;
use serenity::async_trait;
use sticker_bot::prelude::*;

/// Serves fixed bytes per URL
#[derive(Default)]
struct FakeFetcher {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl FakeFetcher {
    fn serve(&self, url: &str, bytes: &[u8]) {
        self.files.lock().unwrap().insert(url.to_string(), bytes.to_vec());
    }
}

#[async_trait]
impl AttachmentFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchSource> {
        self.files
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| format!("404 for {url}").into())
    }
}

async fn registry() -> (tempfile::TempDir, RegistryHandle) {
    let dir = tempfile::tempdir().unwrap();
    let registry = StickerGate::with_root(dir.path()).get_or_init().await.unwrap();
    (dir, registry)
}

fn upload<'a>(name: &'a str, source_url: &'a str, source_filename: &'a str) -> UploadRequest<'a> {
    UploadRequest {
        name,
        source_url,
        source_filename,
        added_by: "carol",
    }
}

/// Tests ingesting a new attachment.
///
/// Expected: the file lands in resources/ and the record points at it
#[tokio::test]
async fn ingest_caches_file_and_registers() {
    let (dir, registry) = registry().await;
    let fetcher = FakeFetcher::default();
    fetcher.serve("https://cdn/cat.gif", b"GIF89a");

    let sticker = registry
        .ingest(&fetcher, upload("cat", "https://cdn/cat.gif", "cat.gif"))
        .await
        .unwrap();

    assert_eq!(sticker.url, "https://cdn/cat.gif");
    assert_eq!(sticker.added_by, "carol");
    assert_eq!(sticker.local_path.as_deref(), Some("resources/cat.gif"));
    assert!(DateTime::parse_from_rfc3339(&sticker.added_at).is_ok());
    assert_eq!(std::fs::read(dir.path().join("resources/cat.gif")).unwrap(), b"GIF89a");
    assert_eq!(registry.get("cat").await.unwrap(), sticker);
}

/// Tests re-uploading under the same name.
///
/// Expected: last write wins for both the record and the cached file, and
/// other stickers are untouched
#[tokio::test]
async fn second_ingest_replaces_first() {
    let (dir, registry) = registry().await;
    let other = Sticker::new("dog", "https://cdn/dog.png", "dave");
    registry.add(other.clone()).await.unwrap();

    let fetcher = FakeFetcher::default();
    fetcher.serve("https://cdn/v1.png", b"first");
    fetcher.serve("https://cdn/v2.png", b"second");

    let first = registry
        .ingest(&fetcher, upload("cat", "https://cdn/v1.png", "v1.png"))
        .await
        .unwrap();
    let second = registry
        .ingest(&fetcher, upload("cat", "https://cdn/v2.png", "v2.png"))
        .await
        .unwrap();

    let stored = registry.get("cat").await.unwrap();
    assert_eq!(stored, second);
    assert_eq!(stored.url, "https://cdn/v2.png");
    let first_at = DateTime::parse_from_rfc3339(&first.added_at).unwrap();
    let second_at = DateTime::parse_from_rfc3339(&stored.added_at).unwrap();
    assert!(second_at >= first_at);
    assert_eq!(std::fs::read(dir.path().join("resources/cat.png")).unwrap(), b"second");
    assert_eq!(registry.get("dog").await.unwrap(), other);
}

/// Tests that upload overwrites a sticker created with add.
///
/// Expected: add rejects the duplicate, ingest replaces it
#[tokio::test]
async fn ingest_bypasses_duplicate_check() {
    let (_dir, registry) = registry().await;
    registry.add(Sticker::new("cat", "https://old/cat.png", "")).await.unwrap();
    assert!(matches!(
        registry.add(Sticker::new("cat", "https://new/cat.png", "")).await,
        Err(StickerError::AlreadyExists(_))
    ));

    let fetcher = FakeFetcher::default();
    fetcher.serve("https://new/cat.png", b"meow");
    registry
        .ingest(&fetcher, upload("cat", "https://new/cat.png", "cat.png"))
        .await
        .unwrap();
    assert_eq!(registry.get("cat").await.unwrap().url, "https://new/cat.png");
}

/// Tests a failed download.
///
/// Expected: Fetch error, nothing written, nothing registered
#[tokio::test]
async fn fetch_failure_commits_nothing() {
    let (dir, registry) = registry().await;
    let fetcher = FakeFetcher::default();

    let result = registry
        .ingest(&fetcher, upload("cat", "https://cdn/missing.png", "missing.png"))
        .await;

    assert!(matches!(result, Err(StickerError::Fetch { .. })));
    assert!(registry.is_empty().await);
    assert_eq!(std::fs::read_dir(dir.path().join(RESOURCES_DIR)).unwrap().count(), 0);
}

/// Tests that hostile names stay inside the resource directory.
///
/// Expected: the file is written as resources/passwd.png; the record keeps
/// the name verbatim
#[tokio::test]
async fn traversal_names_stay_in_resources() {
    let (dir, registry) = registry().await;
    let fetcher = FakeFetcher::default();
    fetcher.serve("https://cdn/x", b"data");

    let sticker = registry
        .ingest(&fetcher, upload("../../passwd", "https://cdn/x", "x"))
        .await
        .unwrap();

    assert_eq!(sticker.name, "../../passwd");
    assert_eq!(sticker.local_path.as_deref(), Some("resources/passwd.png"));
    assert!(dir.path().join("resources/passwd.png").is_file());
}

/// Tests a failed write of the cached image.
///
/// Replaces the resource directory with a plain file before ingesting.
///
/// Expected: Io error, nothing registered, sticker file untouched
#[tokio::test]
async fn write_failure_commits_nothing() {
    let (dir, registry) = registry().await;
    registry.save().await.unwrap();
    let file_before = std::fs::read(dir.path().join(STICKER_FILE)).unwrap();

    let resources = dir.path().join(RESOURCES_DIR);
    std::fs::remove_dir(&resources).unwrap();
    std::fs::write(&resources, "").unwrap();

    let fetcher = FakeFetcher::default();
    fetcher.serve("https://cdn/cat.png", b"meow");
    let result = registry
        .ingest(&fetcher, upload("cat", "https://cdn/cat.png", "cat.png"))
        .await;

    assert!(matches!(result, Err(StickerError::Io { .. })));
    assert!(registry.is_empty().await);
    assert_eq!(std::fs::read(dir.path().join(STICKER_FILE)).unwrap(), file_before);
}

//! # Media Catalog Module
//!
//! The [`MediaCatalog`] trait is the seam between the bot and whatever
//! finds and downloads media. The production implementation shells out to
//! `yt-dlp`; tests plug in in-memory fakes.

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::errors::CatalogError;
use crate::media::{MediaFormat, MediaItem, SearchVariant};

/// Largest file the Telegram Bot API lets a bot upload
pub const MAX_UPLOAD_BYTES: &str = "50M";

lazy_static! {
    static ref ITEM_ID_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("Item id pattern should be valid");
}

/// A downloaded file that lives exactly as long as this value
///
/// The file sits in its own temporary directory, which is removed when the
/// value is dropped, whether or not the upload succeeded.
#[derive(Debug)]
pub struct FetchedMedia {
    pub path: PathBuf,
    _dir: TempDir,
}

impl FetchedMedia {
    pub fn new(dir: TempDir, path: PathBuf) -> Self {
        Self {
            path,
            _dir: dir,
        }
    }

    /// Directory holding the file, deleted on drop
    pub fn dir(&self) -> &Path {
        self._dir.path()
    }
}

/// Search and download backend
#[async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Run one catalog query. `variant` is informational; query modifiers
    /// are already applied by the caller.
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        variant: SearchVariant,
    ) -> Result<Vec<MediaItem>, CatalogError>;

    /// Download `item_id` in `format` into a fresh temporary directory.
    async fn fetch(&self, item_id: &str, format: MediaFormat)
        -> Result<FetchedMedia, CatalogError>;
}

/// Validate an item id before it reaches a command line
pub fn validate_item_id(item_id: &str) -> Result<(), CatalogError> {
    if ITEM_ID_REGEX.is_match(item_id) {
        Ok(())
    } else {
        Err(CatalogError::InvalidItemId(item_id.to_string()))
    }
}

/// Watch URL for an item id
pub fn watch_url(item_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={item_id}")
}

#[derive(Deserialize)]
struct YtDlpEntry {
    id: String,
    title: Option<String>,
    channel: Option<String>,
    uploader: Option<String>,
    duration: Option<f64>,
    webpage_url: Option<String>,
    url: Option<String>,
}

impl YtDlpEntry {
    fn into_item(self) -> MediaItem {
        let source_url = self
            .webpage_url
            .or(self.url.filter(|url| url.starts_with("https://")))
            .unwrap_or_else(|| watch_url(&self.id));
        MediaItem {
            title: self.title.unwrap_or_else(|| "Untitled".to_string()),
            uploader: self.channel.or(self.uploader).unwrap_or_default(),
            duration_seconds: self
                .duration
                .filter(|d| d.is_finite() && *d >= 0.0)
                .map(|d| d.round() as u64),
            source_url,
            id: self.id,
        }
    }
}

/// Parse `yt-dlp --dump-json` output (one JSON object per line)
///
/// Lines that fail to parse are skipped with a warning so one odd entry
/// does not sink the whole result list.
pub fn parse_search_output(stdout: &str) -> Vec<MediaItem> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<YtDlpEntry>(line) {
            Ok(entry) => Some(entry.into_item()),
            Err(e) => {
                warn!(error = %e, "Skipping unparsable yt-dlp entry");
                None
            }
        })
        .collect()
}

/// Catalog backed by the `yt-dlp` command line tool
#[derive(Debug, Clone)]
pub struct YtDlpCatalog {
    binary: String,
    download_dir: PathBuf,
}

impl YtDlpCatalog {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            download_dir: download_dir.into(),
        }
    }

    /// Use a different yt-dlp executable
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn command(&self) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(&self.binary);
        // A timed-out fetch drops the future; the child must not outlive it
        command.kill_on_drop(true);
        command
    }

    fn spawn_error(e: std::io::Error) -> CatalogError {
        if e.kind() == std::io::ErrorKind::NotFound {
            CatalogError::ToolNotFound
        } else {
            CatalogError::Io(e)
        }
    }

    fn stderr_excerpt(stderr: &[u8]) -> String {
        // Limit error message length to avoid dumping huge stderr
        String::from_utf8_lossy(stderr).chars().take(500).collect()
    }
}

#[async_trait]
impl MediaCatalog for YtDlpCatalog {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        variant: SearchVariant,
    ) -> Result<Vec<MediaItem>, CatalogError> {
        info!(%query, %variant, max_results, "Searching catalog");

        let output = self
            .command()
            .args(["--dump-json", "--flat-playlist", "--no-warnings", "--no-exec"])
            .arg("--")
            .arg(format!("ytsearch{max_results}:{query}"))
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if !output.status.success() {
            return Err(CatalogError::Process(Self::stderr_excerpt(&output.stderr)));
        }

        let items = parse_search_output(&String::from_utf8_lossy(&output.stdout));
        debug!(%query, results = items.len(), "Catalog search finished");
        Ok(items)
    }

    async fn fetch(
        &self,
        item_id: &str,
        format: MediaFormat,
    ) -> Result<FetchedMedia, CatalogError> {
        validate_item_id(item_id)?;

        std::fs::create_dir_all(&self.download_dir)?;
        let dir = tempfile::Builder::new()
            .prefix(&format!("fetch-{item_id}-"))
            .tempdir_in(&self.download_dir)?;

        let template = dir.path().join("%(id)s.%(ext)s");
        let template = template.to_str().ok_or_else(|| {
            CatalogError::Process("download directory path contains invalid UTF-8".into())
        })?;

        info!(%item_id, %format, dir = %dir.path().display(), "Fetching media");

        let mut command = self.command();
        command.args([
            "--no-playlist",
            "--no-exec",
            "--no-warnings",
            "--max-filesize",
            MAX_UPLOAD_BYTES,
            "--output",
            template,
            "--print",
            "after_move:filepath",
        ]);
        match format {
            MediaFormat::Audio => {
                command.args(["--extract-audio", "--audio-format", "mp3", "--audio-quality", "0"]);
            }
            MediaFormat::Video => {
                command.args(["--format", "best[ext=mp4][filesize<50M]/best[ext=mp4]/best"]);
            }
        }
        let output = command
            .arg("--")
            .arg(watch_url(item_id))
            .output()
            .await
            .map_err(Self::spawn_error)?;

        if !output.status.success() {
            let stderr = Self::stderr_excerpt(&output.stderr);
            if stderr.contains("Video unavailable") || stderr.contains("Private video") {
                return Err(CatalogError::Unavailable(stderr));
            }
            return Err(CatalogError::Process(stderr));
        }

        let printed = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let path = match printed.lines().last() {
            Some(line) if !line.trim().is_empty() => PathBuf::from(line.trim()),
            _ => find_single_file(dir.path())?,
        };

        // yt-dlp skips files over --max-filesize without failing
        if !path.exists() || !path.starts_with(dir.path()) {
            return Err(CatalogError::MissingOutput { path });
        }

        debug!(path = %path.display(), "Media fetched");
        Ok(FetchedMedia::new(dir, path))
    }
}

fn find_single_file(dir: &Path) -> Result<PathBuf, CatalogError> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() {
            return Ok(path);
        }
    }
    Err(CatalogError::MissingOutput {
        path: dir.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_output() {
        let stdout = r#"{"id": "abc123", "title": "Hotel California", "channel": "Eagles", "duration": 391.0, "url": "https://www.youtube.com/watch?v=abc123"}
not json at all
{"id": "def456", "title": null, "uploader": "Someone", "duration": null}
"#;
        let items = parse_search_output(stdout);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Hotel California");
        assert_eq!(items[0].uploader, "Eagles");
        assert_eq!(items[0].duration_seconds, Some(391));
        assert_eq!(items[1].title, "Untitled");
        assert_eq!(items[1].uploader, "Someone");
        assert_eq!(items[1].source_url, "https://www.youtube.com/watch?v=def456");
    }

    #[test]
    fn test_validate_item_id() {
        assert!(validate_item_id("dQw4w9WgXcQ").is_ok());
        assert!(validate_item_id("a-b_c").is_ok());
        assert!(validate_item_id("").is_err());
        assert!(validate_item_id("--exec rm").is_err());
        assert!(validate_item_id("../etc/passwd").is_err());
    }

    #[test]
    fn test_fetched_media_removes_directory_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("song.mp3");
        std::fs::write(&path, b"audio").unwrap();

        let media = FetchedMedia::new(dir, path.clone());
        let dir_path = media.dir().to_path_buf();
        assert!(path.exists());

        drop(media);
        assert!(!path.exists());
        assert!(!dir_path.exists());
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported() {
        let catalog = YtDlpCatalog::new(std::env::temp_dir())
            .with_binary("definitely-not-a-real-yt-dlp-binary");
        let err = catalog
            .search("anything", 1, SearchVariant::Plain)
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::ToolNotFound));
    }
}

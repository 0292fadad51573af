//! # Media Model Module
//!
//! Value types shared by the catalog, the search orchestration and the
//! dialogue layer: catalog results, search variants, download formats and
//! the per-user playlist.

use std::fmt;

/// A single catalog result.
///
/// The bot never interprets these fields beyond display and re-query; the
/// `id` is handed back to the catalog when the user asks for a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    /// Catalog identifier (e.g. a video id)
    pub id: String,
    /// Human readable title
    pub title: String,
    /// Channel or uploader name, empty when the catalog does not report one
    pub uploader: String,
    /// Length in whole seconds, when known
    pub duration_seconds: Option<u64>,
    /// Public link to the item
    pub source_url: String,
}

impl MediaItem {
    /// Render the duration as `m:ss` or `h:mm:ss`, `?` when unknown.
    pub fn display_duration(&self) -> String {
        match self.duration_seconds {
            Some(total) => {
                let hours = total / 3600;
                let minutes = (total % 3600) / 60;
                let seconds = total % 60;
                if hours > 0 {
                    format!("{hours}:{minutes:02}:{seconds:02}")
                } else {
                    format!("{minutes}:{seconds:02}")
                }
            }
            None => "?".to_string(),
        }
    }
}

/// Which flavour of search the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchVariant {
    #[default]
    Plain,
    Karaoke,
    Album,
    Discography,
}

impl SearchVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchVariant::Plain => "plain",
            SearchVariant::Karaoke => "karaoke",
            SearchVariant::Album => "album",
            SearchVariant::Discography => "discography",
        }
    }

    /// Whether results should go through the "full album" heuristic.
    pub fn wants_full_albums(&self) -> bool {
        matches!(self, SearchVariant::Album | SearchVariant::Discography)
    }
}

impl fmt::Display for SearchVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Download format requested from the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaFormat {
    Audio,
    Video,
}

impl MediaFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFormat::Audio => "audio",
            MediaFormat::Video => "video",
        }
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a search as seen by the dialogue layer.
///
/// Expected outcomes ("nothing found", "the catalog is flaky right now") are
/// values, not errors, so the caller can render them directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<MediaItem>),
    Empty,
    TransientFailure(String),
}

/// One resolved playlist line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: String,
    pub artist: String,
    pub url: String,
}

impl From<&MediaItem> for PlaylistEntry {
    fn from(item: &MediaItem) -> Self {
        Self {
            title: item.title.clone(),
            artist: item.uploader.clone(),
            url: item.source_url.clone(),
        }
    }
}

/// Ordered list of resolved entries. One per user, replaced wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_url(&self, url: &str) -> bool {
        self.entries.iter().any(|entry| entry.url == url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(duration: Option<u64>) -> MediaItem {
        MediaItem {
            id: "abc".to_string(),
            title: "Song".to_string(),
            uploader: "Artist".to_string(),
            duration_seconds: duration,
            source_url: "https://www.youtube.com/watch?v=abc".to_string(),
        }
    }

    #[test]
    fn test_display_duration() {
        assert_eq!(item(Some(59)).display_duration(), "0:59");
        assert_eq!(item(Some(245)).display_duration(), "4:05");
        assert_eq!(item(Some(3725)).display_duration(), "1:02:05");
        assert_eq!(item(None).display_duration(), "?");
    }

    #[test]
    fn test_playlist_entry_from_item() {
        let entry = PlaylistEntry::from(&item(Some(10)));
        assert_eq!(entry.title, "Song");
        assert_eq!(entry.artist, "Artist");
        assert_eq!(entry.url, "https://www.youtube.com/watch?v=abc");
    }
}

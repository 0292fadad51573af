//! # Search Module
//!
//! One code path for every search flavour. A [`SearchVariant`] expands into
//! one or more catalog queries; results are merged, deduplicated by item id
//! and, for album-style variants, filtered by the full-album heuristic.
//! Catalog calls are bounded by timeouts and retried with jittered backoff.

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::catalog::{FetchedMedia, MediaCatalog};
use crate::config::{RecoveryConfig, SearchConfig};
use crate::errors::CatalogError;
use crate::media::{MediaFormat, MediaItem, SearchOutcome, SearchVariant};

/// Longest query accepted from a user
pub const MAX_QUERY_CHARS: usize = 200;

lazy_static! {
    static ref WHITESPACE_REGEX: Regex = Regex::new(r"\s+").expect("Whitespace pattern should be valid");
    static ref FULL_ALBUM_REGEX: Regex =
        Regex::new(r"(?i)\b(full\s+album|[aá]lbum\s+completo|complete\s+album)\b")
            .expect("Full album pattern should be valid");
}

/// Why a query was refused before reaching the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    Empty,
    TooLong,
}

/// Collapse whitespace and validate a user query
pub fn normalize_query(raw: &str) -> Result<String, QueryError> {
    let normalized = WHITESPACE_REGEX.replace_all(raw.trim(), " ").to_string();
    if normalized.is_empty() {
        return Err(QueryError::Empty);
    }
    if normalized.chars().count() > MAX_QUERY_CHARS {
        return Err(QueryError::TooLong);
    }
    Ok(normalized)
}

/// Catalog queries issued for `query` under `variant`
pub fn expand_query(query: &str, variant: SearchVariant) -> Vec<String> {
    match variant {
        SearchVariant::Plain => vec![query.to_string()],
        SearchVariant::Karaoke => vec![format!("{query} karaoke")],
        SearchVariant::Album => vec![format!("{query} full album")],
        SearchVariant::Discography => {
            vec![format!("{query} discography"), format!("{query} full album")]
        }
    }
}

/// Whether an upload looks like a full album rather than a single track
pub fn looks_like_full_album(item: &MediaItem, min_album_duration_secs: u64) -> bool {
    item.duration_seconds
        .is_some_and(|duration| duration >= min_album_duration_secs)
        || FULL_ALBUM_REGEX.is_match(&item.title)
}

/// Keep the first occurrence of each item id
pub fn dedup_by_id(items: Vec<MediaItem>) -> Vec<MediaItem> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id.clone()))
        .collect()
}

/// Apply the full-album heuristic
///
/// The thresholds are guesses; when they reject every candidate the
/// unfiltered list is returned instead of nothing.
pub fn filter_full_albums(items: Vec<MediaItem>, min_album_duration_secs: u64) -> Vec<MediaItem> {
    let albums: Vec<MediaItem> = items
        .iter()
        .filter(|item| looks_like_full_album(item, min_album_duration_secs))
        .cloned()
        .collect();
    if albums.is_empty() {
        items
    } else {
        albums
    }
}

/// Why a download did not produce a file
#[derive(Debug, thiserror::Error)]
pub enum FetchFailure {
    #[error("download timed out")]
    Timeout,

    #[error(transparent)]
    Catalog(CatalogError),
}

/// Timeout- and retry-aware front end to a [`MediaCatalog`]
#[derive(Clone)]
pub struct Searcher {
    catalog: Arc<dyn MediaCatalog>,
    search: SearchConfig,
    recovery: RecoveryConfig,
}

impl Searcher {
    pub fn new(catalog: Arc<dyn MediaCatalog>, search: SearchConfig, recovery: RecoveryConfig) -> Self {
        Self {
            catalog,
            search,
            recovery,
        }
    }

    /// Run a full search for an already normalized query
    pub async fn search(&self, variant: SearchVariant, query: &str) -> SearchOutcome {
        self.search_limited(variant, query, self.search.max_results).await
    }

    /// Search with an explicit per-query result cap
    pub async fn search_limited(
        &self,
        variant: SearchVariant,
        query: &str,
        max_results: usize,
    ) -> SearchOutcome {
        let mut collected = Vec::new();
        let mut last_failure = None;

        for catalog_query in expand_query(query, variant) {
            match self.query_with_retry(&catalog_query, max_results, variant).await {
                Ok(items) => collected.extend(items),
                Err(reason) => last_failure = Some(reason),
            }
        }

        let mut items = dedup_by_id(collected);
        if variant.wants_full_albums() {
            items = filter_full_albums(items, self.search.min_album_duration_secs);
        }

        match (items.is_empty(), last_failure) {
            (false, _) => {
                info!(%query, %variant, results = items.len(), "Search completed");
                SearchOutcome::Found(items)
            }
            (true, Some(reason)) => SearchOutcome::TransientFailure(reason),
            (true, None) => SearchOutcome::Empty,
        }
    }

    /// Download one item, bounded by the fetch timeout
    pub async fn fetch(&self, item_id: &str, format: MediaFormat) -> Result<FetchedMedia, FetchFailure> {
        match tokio::time::timeout(self.recovery.fetch_timeout, self.catalog.fetch(item_id, format)).await {
            Ok(Ok(media)) => Ok(media),
            Ok(Err(e)) => Err(FetchFailure::Catalog(e)),
            Err(_) => Err(FetchFailure::Timeout),
        }
    }

    async fn query_with_retry(
        &self,
        query: &str,
        max_results: usize,
        variant: SearchVariant,
    ) -> Result<Vec<MediaItem>, String> {
        let mut attempt = 0;
        loop {
            let result = tokio::time::timeout(
                self.recovery.search_timeout,
                self.catalog.search(query, max_results, variant),
            )
            .await;

            let reason = match result {
                Ok(Ok(items)) => return Ok(items),
                // Retrying cannot help when the tool is missing
                Ok(Err(CatalogError::ToolNotFound)) => {
                    return Err(CatalogError::ToolNotFound.to_string())
                }
                Ok(Err(e)) => e.to_string(),
                Err(_) => format!("search timed out after {}s", self.recovery.search_timeout.as_secs()),
            };

            if attempt >= self.recovery.max_retries {
                warn!(%query, attempts = attempt + 1, %reason, "Catalog search failed");
                return Err(reason);
            }

            let delay = self.retry_delay(attempt);
            debug!(%query, attempt, delay_ms = delay.as_millis() as u64, %reason, "Retrying catalog search");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Exponential backoff with up to 25% random jitter, capped
    fn retry_delay(&self, attempt: u32) -> Duration {
        let base = self
            .recovery
            .base_retry_delay_ms
            .saturating_mul(1u64 << attempt.min(16));
        let jitter = if base > 0 {
            rand::thread_rng().gen_range(0..=base / 4)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter).min(self.recovery.max_retry_delay_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, title: &str, duration: Option<u64>) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: title.to_string(),
            uploader: String::new(),
            duration_seconds: duration,
            source_url: format!("https://www.youtube.com/watch?v={id}"),
        }
    }

    #[test]
    fn test_fetch_failure_messages() {
        assert_eq!(FetchFailure::Timeout.to_string(), "download timed out");
        let failure = FetchFailure::Catalog(CatalogError::Unavailable("geo blocked".to_string()));
        assert_eq!(
            failure.to_string(),
            CatalogError::Unavailable("geo blocked".to_string()).to_string()
        );
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  Bad   Bunny \n").unwrap(), "Bad Bunny");
        assert_eq!(normalize_query("   "), Err(QueryError::Empty));
        assert_eq!(normalize_query(&"x".repeat(201)), Err(QueryError::TooLong));
    }

    #[test]
    fn test_expand_query_per_variant() {
        assert_eq!(expand_query("Queen", SearchVariant::Plain), vec!["Queen"]);
        assert_eq!(expand_query("Queen", SearchVariant::Karaoke), vec!["Queen karaoke"]);
        assert_eq!(expand_query("Queen", SearchVariant::Album), vec!["Queen full album"]);
        assert_eq!(
            expand_query("Queen", SearchVariant::Discography),
            vec!["Queen discography", "Queen full album"]
        );
    }

    #[test]
    fn test_full_album_heuristic() {
        assert!(looks_like_full_album(&item("a", "Whatever", Some(1500)), 1200));
        assert!(looks_like_full_album(&item("b", "Abbey Road (Full Album)", Some(300)), 1200));
        assert!(looks_like_full_album(&item("c", "Mañana - Álbum Completo", None), 1200));
        assert!(!looks_like_full_album(&item("d", "Single track", Some(240)), 1200));
    }

    #[test]
    fn test_filter_full_albums_falls_back_when_nothing_matches() {
        let items = vec![item("a", "Track one", Some(200)), item("b", "Track two", Some(210))];
        assert_eq!(filter_full_albums(items.clone(), 1200), items);

        let mixed = vec![item("a", "Track", Some(200)), item("b", "Album", Some(2400))];
        let filtered = filter_full_albums(mixed, 1200);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "b");
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let items = vec![
            item("a", "first", None),
            item("b", "other", None),
            item("a", "second", None),
        ];
        let deduped = dedup_by_id(items);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].title, "first");
    }
}

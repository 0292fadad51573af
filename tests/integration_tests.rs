//! # Integration Tests
//!
//! Cross-module behaviour of the building blocks: pagination bounds, the
//! sliding-window limiter, draft resolution and the retrying searcher.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use music_finder_bot::catalog::{FetchedMedia, MediaCatalog};
use music_finder_bot::config::{RateLimitConfig, RecoveryConfig, SearchConfig};
use music_finder_bot::errors::CatalogError;
use music_finder_bot::media::{MediaFormat, MediaItem, SearchOutcome, SearchVariant};
use music_finder_bot::pagination::{clamp_page_index, page, shift_page, total_pages};
use music_finder_bot::playlist::{finalize, TermFailureKind, TermLookup};
use music_finder_bot::rate_limiter::RateLimiter;
use music_finder_bot::search::{FetchFailure, Searcher};

fn item(id: &str) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        title: format!("Title {id}"),
        uploader: "Artist".to_string(),
        duration_seconds: Some(240),
        source_url: format!("https://www.youtube.com/watch?v={id}"),
    }
}

#[test]
fn test_page_never_exceeds_page_size_and_index_is_clamped() {
    for len in 0..=23usize {
        let items: Vec<usize> = (0..len).collect();
        for page_size in 1..=7usize {
            let pages = total_pages(len, page_size);
            assert_eq!(pages, len.div_ceil(page_size));
            for requested in 0..pages + 3 {
                let current = page(&items, requested, page_size);
                assert!(current.items.len() <= page_size);
                let expected = requested.min(pages.saturating_sub(1));
                assert_eq!(current.index, expected);
                assert_eq!(clamp_page_index(len, page_size, requested), expected);
                if len > 0 {
                    assert!(!current.items.is_empty());
                    assert_eq!(current.items[0], current.offset);
                }
            }
        }
    }
}

#[test]
fn test_shift_page_stays_in_range() {
    // 12 results, 5 per page: pages 0..=2
    assert_eq!(shift_page(12, 5, 0, -1), 0);
    assert_eq!(shift_page(12, 5, 0, 1), 1);
    assert_eq!(shift_page(12, 5, 2, 1), 2);
    assert_eq!(shift_page(12, 5, 2, i32::MIN), 0);
    assert_eq!(shift_page(12, 5, 1, i32::MAX), 2);
    assert_eq!(shift_page(0, 5, 0, 1), 0);
}

#[test]
fn test_rate_limiter_window_slides() {
    let limiter = RateLimiter::new(&RateLimitConfig {
        max_requests: 3,
        window_seconds: 10,
    });
    let start = Instant::now();

    for i in 0..3 {
        assert!(limiter.is_allowed_at(7, start + Duration::from_secs(i)));
    }
    assert!(!limiter.is_allowed_at(7, start + Duration::from_secs(5)));
    assert_eq!(
        limiter.get_wait_time_at(7, start + Duration::from_secs(5)),
        Duration::from_secs(5)
    );

    // Denied attempts do not push the window out
    assert!(limiter.is_allowed_at(7, start + Duration::from_secs(10)));
    assert!(!limiter.is_allowed_at(7, start + Duration::from_secs(10)));

    // Another user has their own budget
    assert!(limiter.is_allowed_at(8, start + Duration::from_secs(5)));
}

#[tokio::test]
async fn test_finalize_reports_partial_resolution() {
    let terms: Vec<String> = ["Hotel California", "Imagine", "Wonderwall"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let report = finalize(&terms, |term| async move {
        let outcome = match term.as_str() {
            "Hotel California" => SearchOutcome::Found(vec![item("hc1"), item("hc2")]),
            "Wonderwall" => SearchOutcome::TransientFailure("timed out".to_string()),
            _ => SearchOutcome::Empty,
        };
        TermLookup::from(outcome)
    })
    .await;

    assert_eq!(report.requested, 3);
    assert_eq!(report.resolved, 1);
    assert_eq!(report.playlist.entries[0].url, item("hc1").source_url);
    let failed: Vec<&str> = report.failures.iter().map(|f| f.term.as_str()).collect();
    assert_eq!(failed, vec!["Imagine", "Wonderwall"]);
    assert_eq!(report.failures[0].kind, TermFailureKind::NotFound);
    assert_eq!(report.failures[1].kind, TermFailureKind::Failed);
}

#[tokio::test]
async fn test_finalize_skips_terms_resolving_to_same_url() {
    let terms = vec!["Imagine".to_string(), "imagine lennon".to_string()];
    let report = finalize(&terms, |_| async {
        TermLookup::from(SearchOutcome::Found(vec![item("im")]))
    }).await;

    assert_eq!(report.resolved, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, TermFailureKind::Duplicate);
}

/// Fails the first `failures` searches, then returns one item
struct FlakyCatalog {
    failures: usize,
    calls: AtomicUsize,
}

#[async_trait]
impl MediaCatalog for FlakyCatalog {
    async fn search(
        &self,
        query: &str,
        _max_results: usize,
        _variant: SearchVariant,
    ) -> Result<Vec<MediaItem>, CatalogError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(CatalogError::Process(format!("attempt {call} failed")));
        }
        Ok(vec![item(&query.replace(' ', "_"))])
    }

    async fn fetch(&self, _item_id: &str, _format: MediaFormat) -> Result<FetchedMedia, CatalogError> {
        Err(CatalogError::Unavailable("not in this test".to_string()))
    }
}

fn fast_recovery(max_retries: u32) -> RecoveryConfig {
    RecoveryConfig {
        max_retries,
        base_retry_delay_ms: 1,
        max_retry_delay_ms: 5,
        ..RecoveryConfig::default()
    }
}

#[tokio::test]
async fn test_searcher_retries_transient_failures() {
    let catalog = Arc::new(FlakyCatalog {
        failures: 2,
        calls: AtomicUsize::new(0),
    });
    let searcher = Searcher::new(catalog.clone(), SearchConfig::default(), fast_recovery(2));

    let outcome = searcher.search(SearchVariant::Plain, "Bad Bunny").await;
    assert!(matches!(outcome, SearchOutcome::Found(ref items) if items.len() == 1));
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_searcher_gives_up_after_retries() {
    let catalog = Arc::new(FlakyCatalog {
        failures: 10,
        calls: AtomicUsize::new(0),
    });
    let searcher = Searcher::new(catalog.clone(), SearchConfig::default(), fast_recovery(1));

    let outcome = searcher.search(SearchVariant::Karaoke, "Bad Bunny").await;
    assert!(matches!(outcome, SearchOutcome::TransientFailure(ref reason) if reason.contains("attempt 1")));
    assert_eq!(catalog.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_searcher_fetch_errors_are_reported() {
    let catalog = Arc::new(FlakyCatalog {
        failures: 0,
        calls: AtomicUsize::new(0),
    });
    let searcher = Searcher::new(catalog, SearchConfig::default(), fast_recovery(0));

    let failure = searcher
        .fetch("abc", MediaFormat::Audio)
        .await
        .expect_err("fetch should fail");
    assert!(matches!(failure, FetchFailure::Catalog(CatalogError::Unavailable(_))));
}

//! # Playlist Module
//!
//! Per-user playlists and the accumulator that turns a draft of free-text
//! song/artist names into resolved entries.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

use crate::media::{Playlist, PlaylistEntry, SearchOutcome};
use crate::session::UserId;

/// Most entries accepted in one draft
pub const MAX_DRAFT_ENTRIES: usize = 25;
/// Longest single draft entry
pub const MAX_DRAFT_ENTRY_CHARS: usize = 200;

/// Result of adding an item to a user's playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added { len: usize },
    Duplicate,
}

/// Why a draft entry was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftError {
    Empty,
    TooLong,
    Full,
}

/// Append a trimmed term to a playlist draft
pub fn push_draft_term(draft: &mut Vec<String>, raw: &str) -> Result<usize, DraftError> {
    let term = raw.trim();
    if term.is_empty() {
        return Err(DraftError::Empty);
    }
    if term.chars().count() > MAX_DRAFT_ENTRY_CHARS {
        return Err(DraftError::TooLong);
    }
    if draft.len() >= MAX_DRAFT_ENTRIES {
        return Err(DraftError::Full);
    }
    draft.push(term.to_string());
    Ok(draft.len())
}

/// Why a draft term did not make it into the playlist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermFailureKind {
    NotFound,
    /// First hit was already resolved by an earlier term
    Duplicate,
    /// Catalog error or timeout; details only go to the log
    Failed,
    /// Lookup refused by the rate limiter
    RateLimited,
}

impl TermFailureKind {
    /// Localization key describing the failure
    pub fn message_key(&self) -> &'static str {
        match self {
            TermFailureKind::NotFound => "playlist-reason-not-found",
            TermFailureKind::Duplicate => "playlist-reason-duplicate",
            TermFailureKind::Failed => "playlist-reason-failed",
            TermFailureKind::RateLimited => "playlist-reason-rate-limited",
        }
    }
}

/// A draft term that could not be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermFailure {
    pub term: String,
    pub kind: TermFailureKind,
}

/// Result of looking up one draft term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermLookup {
    Searched(SearchOutcome),
    /// The lookup was not admitted; later terms are not attempted
    RateLimited,
}

impl From<SearchOutcome> for TermLookup {
    fn from(outcome: SearchOutcome) -> Self {
        TermLookup::Searched(outcome)
    }
}

/// Outcome of finalizing a draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizeReport {
    pub playlist: Playlist,
    pub requested: usize,
    pub resolved: usize,
    pub failures: Vec<TermFailure>,
}

/// Resolve every draft term independently, in order
///
/// Each term takes the first hit of its search. A term with no hit, or
/// whose search failed, is dropped with a note instead of failing the whole
/// playlist. Once a lookup is rate limited the remaining terms are reported
/// as rate limited without being searched.
pub async fn finalize<F, Fut>(terms: &[String], mut resolve: F) -> FinalizeReport
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = TermLookup>,
{
    let mut playlist = Playlist::default();
    let mut failures = Vec::new();
    let mut limited = false;

    for term in terms {
        let fail = |kind| TermFailure {
            term: term.clone(),
            kind,
        };
        if limited {
            failures.push(fail(TermFailureKind::RateLimited));
            continue;
        }

        match resolve(term.clone()).await {
            TermLookup::RateLimited => {
                debug!(%term, "Draft lookup rate limited");
                limited = true;
                failures.push(fail(TermFailureKind::RateLimited));
            }
            TermLookup::Searched(SearchOutcome::Found(items)) => match items.first() {
                Some(item) => {
                    let entry = PlaylistEntry::from(item);
                    if playlist.contains_url(&entry.url) {
                        debug!(%term, url = %entry.url, "Draft term resolved to a duplicate entry");
                        failures.push(fail(TermFailureKind::Duplicate));
                    } else {
                        playlist.entries.push(entry);
                    }
                }
                None => failures.push(fail(TermFailureKind::NotFound)),
            },
            TermLookup::Searched(SearchOutcome::Empty) => {
                failures.push(fail(TermFailureKind::NotFound))
            }
            TermLookup::Searched(SearchOutcome::TransientFailure(reason)) => {
                warn!(%term, %reason, "Draft term lookup failed");
                failures.push(fail(TermFailureKind::Failed));
            }
        }
    }

    let report = FinalizeReport {
        requested: terms.len(),
        resolved: playlist.len(),
        playlist,
        failures,
    };
    info!(
        requested = report.requested,
        resolved = report.resolved,
        "Playlist draft finalized"
    );
    report
}

/// One playlist per user, kept in memory
#[derive(Debug, Default)]
pub struct PlaylistBook {
    playlists: Mutex<HashMap<UserId, Playlist>>,
}

impl PlaylistBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unless its url is already present
    pub fn add(&self, user: UserId, entry: PlaylistEntry) -> AddOutcome {
        let mut playlists = self.lock();
        let playlist = playlists.entry(user).or_default();
        if playlist.contains_url(&entry.url) {
            return AddOutcome::Duplicate;
        }
        playlist.entries.push(entry);
        AddOutcome::Added {
            len: playlist.len(),
        }
    }

    /// Replace the user's playlist wholesale
    pub fn replace(&self, user: UserId, playlist: Playlist) {
        self.lock().insert(user, playlist);
    }

    pub fn get(&self, user: UserId) -> Option<Playlist> {
        self.lock().get(&user).cloned()
    }

    /// Remove the user's playlist; returns whether one existed
    pub fn clear(&self, user: UserId) -> bool {
        self.lock().remove(&user).is_some_and(|p| !p.is_empty())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Playlist>> {
        self.playlists.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str) -> PlaylistEntry {
        PlaylistEntry {
            title: "Title".to_string(),
            artist: "Artist".to_string(),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_push_draft_term() {
        let mut draft = Vec::new();
        assert_eq!(push_draft_term(&mut draft, "  Imagine "), Ok(1));
        assert_eq!(draft, vec!["Imagine"]);
        assert_eq!(push_draft_term(&mut draft, "   "), Err(DraftError::Empty));
        assert_eq!(
            push_draft_term(&mut draft, &"a".repeat(MAX_DRAFT_ENTRY_CHARS + 1)),
            Err(DraftError::TooLong)
        );

        let mut full: Vec<String> = (0..MAX_DRAFT_ENTRIES).map(|i| i.to_string()).collect();
        assert_eq!(push_draft_term(&mut full, "one more"), Err(DraftError::Full));
    }

    #[test]
    fn test_add_rejects_duplicate_url() {
        let book = PlaylistBook::new();
        assert_eq!(book.add(1, entry("u1")), AddOutcome::Added { len: 1 });
        assert_eq!(book.add(1, entry("u2")), AddOutcome::Added { len: 2 });
        assert_eq!(book.add(1, entry("u1")), AddOutcome::Duplicate);
        assert_eq!(book.get(1).unwrap().len(), 2);
        // Other users are unaffected
        assert_eq!(book.add(2, entry("u1")), AddOutcome::Added { len: 1 });
    }

    #[test]
    fn test_replace_and_clear() {
        let book = PlaylistBook::new();
        book.add(1, entry("old"));
        book.replace(
            1,
            Playlist {
                entries: vec![entry("new")],
            },
        );
        assert_eq!(book.get(1).unwrap().entries[0].url, "new");
        assert!(book.clear(1));
        assert!(book.get(1).is_none());
        assert!(!book.clear(1));
    }

    #[tokio::test]
    async fn test_finalize_stops_after_rate_limit() {
        let terms: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let mut lookups = 0;

        let report = finalize(&terms, |_| {
            lookups += 1;
            let admitted = lookups == 1;
            async move {
                if admitted {
                    SearchOutcome::Empty.into()
                } else {
                    TermLookup::RateLimited
                }
            }
        })
        .await;

        // "c" is never looked up
        assert_eq!(lookups, 2);
        assert_eq!(report.resolved, 0);
        let kinds: Vec<TermFailureKind> = report.failures.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TermFailureKind::NotFound,
                TermFailureKind::RateLimited,
                TermFailureKind::RateLimited
            ]
        );
    }
}

//! Session store module for tracking each user's conversational position.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::media::{MediaItem, SearchVariant};

/// Platform identity of a user (the Telegram chat id)
pub type UserId = i64;

/// Where a user currently is in the menu tree
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Idle,
    AwaitingQuery(SearchVariant),
    AwaitingPlaylistItem,
    BrowsingResults,
    ViewingItem,
}

/// Per-user conversational state
#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub mode: Mode,
    /// Variant of the most recent search, reused for follow-up queries
    pub variant: SearchVariant,
    pub query: Option<String>,
    /// Replaced wholesale by every successful search
    pub result_set: Vec<MediaItem>,
    pub page_index: usize,
    pub selected_item: Option<MediaItem>,
    pub playlist_draft: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            mode: Mode::Idle,
            variant: SearchVariant::Plain,
            query: None,
            result_set: Vec::new(),
            page_index: 0,
            selected_item: None,
            playlist_draft: Vec::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// Whether the session has been idle longer than `ttl` at `now`
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now - self.last_active_at > ttl,
            Err(_) => false,
        }
    }

    /// Replace the results of a search and go back to the first page
    pub fn store_results(&mut self, variant: SearchVariant, query: String, items: Vec<MediaItem>) {
        self.mode = Mode::BrowsingResults;
        self.variant = variant;
        self.query = Some(query);
        self.result_set = items;
        self.page_index = 0;
        self.selected_item = None;
    }

    /// Select `index` from the current results
    ///
    /// Returns `None` without touching the session when the index does not
    /// fit the current result set (e.g. a button from an older search).
    pub fn select(&mut self, index: usize) -> Option<&MediaItem> {
        let item = self.result_set.get(index)?.clone();
        self.selected_item = Some(item);
        self.mode = Mode::ViewingItem;
        self.selected_item.as_ref()
    }

    /// Forget a stale selection while keeping the results
    pub fn clear_selection(&mut self) {
        self.selected_item = None;
        if self.mode == Mode::ViewingItem {
            self.mode = Mode::BrowsingResults;
        }
    }
}

/// Outcome of loading a session for a transition
#[derive(Debug, Clone)]
pub struct Checkout {
    pub session: Session,
    /// True when a non-idle session was found past its TTL and replaced
    pub expired: bool,
}

/// In-memory session store keyed by user
///
/// Sessions are created lazily, replaced when they expire and dropped on
/// explicit reset. Nothing survives a restart.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the user's session, or a fresh idle one. Never fails.
    pub fn get_or_create(&self, user: UserId) -> Session {
        self.checkout(user, Utc::now()).session
    }

    /// Load the user's session for a transition at `now`
    ///
    /// An expired session is replaced by a fresh idle one before anything
    /// can read its stale results or selection.
    pub fn checkout(&self, user: UserId, now: DateTime<Utc>) -> Checkout {
        let mut sessions = self.lock();
        match sessions.get(&user) {
            Some(existing) if !existing.is_expired(now, self.ttl) => Checkout {
                session: existing.clone(),
                expired: false,
            },
            Some(existing) => {
                let expired = existing.mode != Mode::Idle;
                tracing::debug!(user_id = user, "Replacing expired session");
                let fresh = Session::new(now);
                sessions.insert(user, fresh.clone());
                Checkout {
                    session: fresh,
                    expired,
                }
            }
            None => {
                let fresh = Session::new(now);
                sessions.insert(user, fresh.clone());
                Checkout {
                    session: fresh,
                    expired: false,
                }
            }
        }
    }

    /// Store `session` for `user`, marking it active at `now`
    pub fn save(&self, user: UserId, mut session: Session, now: DateTime<Utc>) {
        session.last_active_at = now;
        self.lock().insert(user, session);
    }

    /// Drop the user's session entirely
    pub fn reset(&self, user: UserId) -> bool {
        self.lock().remove(&user).is_some()
    }

    /// Peek at a session without creating one
    pub fn get(&self, user: UserId) -> Option<Session> {
        self.lock().get(&user).cloned()
    }

    /// Remove every session past its TTL, returning how many were dropped
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now, self.ttl));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<UserId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

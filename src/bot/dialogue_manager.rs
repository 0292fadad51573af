//! Dialogue Manager module for handling session state transitions
//!
//! [`MusicBot`] owns all per-user state (sessions, rate-limit histories,
//! playlists, in-flight markers) and maps each incoming event onto the menu
//! state machine:
//!
//! ```text
//! idle --choose_mode(search variant)--> awaiting_query(variant)
//! idle --choose_playlist--> awaiting_playlist_item
//! awaiting_query --text--> browsing_results        (catalog search)
//! browsing_results --select(i)--> viewing_item     (i checked against current results)
//! browsing_results --paginate(d)--> browsing_results (clamped)
//! viewing_item --fetch(format)--> viewing_item     (file upload or failure notice)
//! viewing_item --add_to_playlist--> viewing_item   (dedup by url)
//! viewing_item --back--> browsing_results
//! * --back_to_menu--> idle                         (session reset)
//! awaiting_playlist_item --text--> awaiting_playlist_item (draft grows)
//! awaiting_playlist_item --finalize--> idle         (draft resolved into the playlist)
//! ```
//!
//! Every failure of an external collaborator ends as a chat notice; nothing
//! escapes [`MusicBot::handle_event`].

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::action::{Action, MenuMode};
use crate::catalog::MediaCatalog;
use crate::config::BotConfig;
use crate::in_flight::InFlight;
use crate::localization::{t_args_lang, t_lang};
use crate::media::{MediaFormat, PlaylistEntry, SearchOutcome, SearchVariant};
use crate::pagination::{clamp_page_index, shift_page};
use crate::playlist::{
    self, push_draft_term, AddOutcome, DraftError, PlaylistBook, TermLookup, MAX_DRAFT_ENTRIES,
};
use crate::rate_limiter::RateLimiter;
use crate::search::{normalize_query, QueryError, Searcher};
use crate::session::{Checkout, Mode, Session, SessionStore, UserId};
use crate::speech::SpeechToText;

use super::gateway::{EventKind, IncomingEvent, Keyboard, MessageRef, MessagingGateway};
use super::ui_builder;

/// Slash commands understood in any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Playlist,
    Clear,
    Cancel,
    Unknown,
}

/// Recognize a slash command, ignoring a `@BotName` suffix and arguments
pub fn parse_command(text: &str) -> Option<Command> {
    let word = text.trim().split_whitespace().next()?;
    let name = word.strip_prefix('/')?;
    let name = name.split('@').next().unwrap_or(name).to_lowercase();
    Some(match name.as_str() {
        "start" | "menu" => Command::Start,
        "help" => Command::Help,
        "playlist" => Command::Playlist,
        "clear" => Command::Clear,
        "cancel" => Command::Cancel,
        _ => Command::Unknown,
    })
}

/// Per-event context: who is talking and where to answer
struct Ctx<'a> {
    gateway: &'a dyn MessagingGateway,
    user: UserId,
    language_code: Option<&'a str>,
    /// Message carrying the pressed button, edited in place when possible
    message: Option<MessageRef>,
}

impl Ctx<'_> {
    async fn say(&self, text: String, keyboard: Option<Keyboard>) -> Result<()> {
        self.gateway.send(self.user, &text, keyboard).await?;
        Ok(())
    }

    /// Replace the button's message, or send a new one if that fails
    async fn show(&self, text: String, keyboard: Keyboard) -> Result<()> {
        if let Some(message) = self.message {
            match self.gateway.edit(message, &text, Some(keyboard.clone())).await {
                Ok(()) => return Ok(()),
                Err(e) => debug!(user_id = self.user, error = %e, "Edit failed, sending a new message"),
            }
        }
        self.say(text, Some(keyboard)).await
    }

    fn t(&self, key: &str) -> String {
        t_lang(key, self.language_code)
    }

    fn t_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        t_args_lang(key, args, self.language_code)
    }
}

/// The conversational core of the bot
pub struct MusicBot {
    sessions: SessionStore,
    limiter: RateLimiter,
    playlists: PlaylistBook,
    in_flight: InFlight,
    searcher: Searcher,
    transcriber: Option<Arc<dyn SpeechToText>>,
    page_size: usize,
    transcribe_timeout: Duration,
}

impl MusicBot {
    pub fn new(
        config: &BotConfig,
        catalog: Arc<dyn MediaCatalog>,
        transcriber: Option<Arc<dyn SpeechToText>>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(config.session_ttl),
            limiter: RateLimiter::new(&config.rate_limit),
            playlists: PlaylistBook::new(),
            in_flight: InFlight::new(),
            searcher: Searcher::new(catalog, config.search.clone(), config.recovery.clone()),
            transcriber,
            page_size: config.results_per_page.max(1),
            transcribe_timeout: config.recovery.transcribe_timeout,
        }
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn playlists(&self) -> &PlaylistBook {
        &self.playlists
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Drop expired sessions and idle rate-limit histories
    pub fn sweep(&self) -> (usize, usize) {
        let sessions = self.sessions.sweep_expired(Utc::now());
        let limiter = self.limiter.prune(Instant::now());
        (sessions, limiter)
    }

    /// Process one event to completion
    ///
    /// Overlapping events for the same user are answered with a "please
    /// wait" notice and dropped. Errors are logged and turned into a
    /// generic notice; they never propagate to the dispatcher.
    pub async fn handle_event(&self, gateway: &dyn MessagingGateway, event: IncomingEvent) {
        let user = event.user_id;
        let language_code = event.language_code.as_deref();

        let Some(_guard) = self.in_flight.try_begin(user) else {
            debug!(user_id = user, "Event rejected while another one is in flight");
            if let Err(e) = gateway.send(user, &t_lang("busy-wait", language_code), None).await {
                warn!(user_id = user, error = %e, "Failed to send busy notice");
            }
            return;
        };

        let message = match &event.kind {
            EventKind::Callback { message, .. } => *message,
            _ => None,
        };
        let ctx = Ctx {
            gateway,
            user,
            language_code,
            message,
        };

        let result = match event.kind {
            EventKind::Text(text) => self.on_text(&ctx, &text).await,
            EventKind::Callback { token, .. } => self.on_callback(&ctx, &token).await,
            EventKind::Voice(audio) => self.on_voice(&ctx, &audio).await,
        };

        if let Err(e) = result {
            error!(user_id = user, error = %e, "Failed to handle event");
            let notice = ctx.say(ctx.t("error-generic"), Some(ui_builder::menu_keyboard(language_code)));
            if let Err(e) = notice.await {
                warn!(user_id = user, error = %e, "Failed to send error notice");
            }
        }
    }

    async fn on_text(&self, ctx: &Ctx<'_>, text: &str) -> Result<()> {
        debug!(user_id = ctx.user, message_length = text.len(), "Received text message from user");

        if let Some(command) = parse_command(text) {
            return self.on_command(ctx, command).await;
        }

        let now = Utc::now();
        let Checkout { session, expired } = self.sessions.checkout(ctx.user, now);
        if expired {
            return self.notify_expired(ctx).await;
        }

        match session.mode {
            Mode::AwaitingPlaylistItem => self.add_draft_term(ctx, session, text).await,
            Mode::AwaitingQuery(variant) => self.run_search(ctx, session, variant, text).await,
            Mode::Idle => self.run_search(ctx, session, SearchVariant::Plain, text).await,
            Mode::BrowsingResults | Mode::ViewingItem => {
                let variant = session.variant;
                self.run_search(ctx, session, variant, text).await
            }
        }
    }

    async fn on_command(&self, ctx: &Ctx<'_>, command: Command) -> Result<()> {
        info!(user_id = ctx.user, command = ?command, "Command received");
        match command {
            Command::Start => {
                self.sessions.reset(ctx.user);
                ctx.say(ui_builder::welcome_text(ctx.language_code), None).await?;
                let (text, keyboard) = ui_builder::main_menu(ctx.language_code);
                ctx.say(text, Some(keyboard)).await
            }
            Command::Cancel => {
                self.sessions.reset(ctx.user);
                let (text, keyboard) = ui_builder::main_menu(ctx.language_code);
                ctx.say(text, Some(keyboard)).await
            }
            Command::Playlist => self.show_playlist(ctx).await,
            Command::Clear => self.clear_playlist(ctx).await,
            Command::Help | Command::Unknown => {
                ctx.say(ctx.t("help-text"), Some(ui_builder::menu_keyboard(ctx.language_code)))
                    .await
            }
        }
    }

    async fn on_callback(&self, ctx: &Ctx<'_>, token: &str) -> Result<()> {
        match token.parse::<Action>() {
            Ok(action) => {
                debug!(user_id = ctx.user, %action, "Callback action");
                self.on_action(ctx, action).await
            }
            Err(e) => {
                warn!(user_id = ctx.user, error = %e, "Unrecognized callback token");
                ctx.say(ctx.t("session-stale"), Some(ui_builder::menu_keyboard(ctx.language_code)))
                    .await
            }
        }
    }

    async fn on_action(&self, ctx: &Ctx<'_>, action: Action) -> Result<()> {
        // Actions that do not depend on the session
        match action {
            Action::Noop => return Ok(()),
            Action::BackToMenu => return self.back_to_menu(ctx).await,
            Action::ChooseMode(mode) => return self.choose_mode(ctx, mode).await,
            Action::ShowPlaylist => return self.show_playlist(ctx).await,
            Action::ClearPlaylist => return self.clear_playlist(ctx).await,
            _ => {}
        }

        let Checkout { session, expired } = self.sessions.checkout(ctx.user, Utc::now());
        if expired {
            return self.notify_expired(ctx).await;
        }

        match (action, session.mode) {
            (Action::Select(index), Mode::BrowsingResults | Mode::ViewingItem) => {
                self.select(ctx, session, index).await
            }
            (Action::Paginate(delta), Mode::BrowsingResults | Mode::ViewingItem) => {
                self.paginate(ctx, session, delta).await
            }
            (Action::Fetch(format), Mode::ViewingItem) => self.fetch(ctx, session, format).await,
            (Action::Link, Mode::ViewingItem) => self.send_link(ctx, session).await,
            (Action::AddToPlaylist, Mode::ViewingItem) => self.add_to_playlist(ctx, session).await,
            (Action::Back, Mode::ViewingItem | Mode::BrowsingResults) => {
                self.back_to_results(ctx, session).await
            }
            // Item card left on screen after the results moved on
            (Action::Fetch(_) | Action::Link | Action::AddToPlaylist, Mode::BrowsingResults) => {
                self.stale_selection(ctx, session).await
            }
            (Action::Finalize, Mode::AwaitingPlaylistItem) => self.finalize(ctx, session).await,
            (Action::Back, _) => self.back_to_menu(ctx).await,
            (action, mode) => {
                // Button from an older conversation, or no session at all
                debug!(user_id = ctx.user, %action, mode = ?mode, "Action does not fit the session");
                self.sessions.reset(ctx.user);
                ctx.say(ctx.t("session-stale"), Some(ui_builder::main_menu(ctx.language_code).1))
                    .await
            }
        }
    }

    async fn on_voice(&self, ctx: &Ctx<'_>, audio: &[u8]) -> Result<()> {
        let Some(transcriber) = &self.transcriber else {
            return ctx.say(ctx.t("voice-unsupported"), None).await;
        };

        debug!(user_id = ctx.user, bytes = audio.len(), "Received voice message from user");
        let transcription = tokio::time::timeout(
            self.transcribe_timeout,
            transcriber.transcribe(audio, ctx.language_code),
        )
        .await;

        match transcription {
            Ok(Ok(text)) => {
                ctx.say(ctx.t_args("voice-heard", &[("text", &text)]), None).await?;
                self.on_text(ctx, &text).await
            }
            Ok(Err(e)) => {
                warn!(user_id = ctx.user, error = %e, "Transcription failed");
                ctx.say(ctx.t("voice-failed"), None).await
            }
            Err(_) => {
                warn!(user_id = ctx.user, "Transcription timed out");
                ctx.say(ctx.t("voice-failed"), None).await
            }
        }
    }

    async fn notify_expired(&self, ctx: &Ctx<'_>) -> Result<()> {
        info!(user_id = ctx.user, "Session expired");
        let (_, keyboard) = ui_builder::main_menu(ctx.language_code);
        ctx.say(ctx.t("session-expired"), Some(keyboard)).await
    }

    /// Consult the rate limiter; tells the user how long to wait when denied
    async fn admit(&self, ctx: &Ctx<'_>) -> Result<bool> {
        if self.limiter.is_allowed(ctx.user) {
            return Ok(true);
        }
        let wait = self.limiter.get_wait_time(ctx.user);
        let seconds = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
        info!(user_id = ctx.user, wait_secs = seconds, "Request rate limited");
        ctx.say(ctx.t_args("rate-limited", &[("seconds", &seconds.to_string())]), None)
            .await?;
        Ok(false)
    }

    async fn back_to_menu(&self, ctx: &Ctx<'_>) -> Result<()> {
        self.sessions.reset(ctx.user);
        let (text, keyboard) = ui_builder::main_menu(ctx.language_code);
        ctx.show(text, keyboard).await
    }

    async fn choose_mode(&self, ctx: &Ctx<'_>, mode: MenuMode) -> Result<()> {
        let now = Utc::now();
        let mut session = Session::new(now);
        session.mode = match mode.search_variant() {
            Some(variant) => {
                session.variant = variant;
                Mode::AwaitingQuery(variant)
            }
            None => Mode::AwaitingPlaylistItem,
        };
        self.sessions.save(ctx.user, session, now);

        let (text, keyboard) = ui_builder::mode_prompt(mode, ctx.language_code);
        ctx.show(text, keyboard).await
    }

    async fn run_search(
        &self,
        ctx: &Ctx<'_>,
        mut session: Session,
        variant: SearchVariant,
        raw_query: &str,
    ) -> Result<()> {
        let query = match normalize_query(raw_query) {
            Ok(query) => query,
            Err(QueryError::Empty) => return ctx.say(ctx.t("search-empty-query"), None).await,
            Err(QueryError::TooLong) => return ctx.say(ctx.t("search-query-too-long"), None).await,
        };

        if !self.admit(ctx).await? {
            return Ok(());
        }

        ctx.say(ctx.t_args("search-in-progress", &[("query", &query)]), None)
            .await?;

        match self.searcher.search(variant, &query).await {
            SearchOutcome::Found(items) => {
                info!(user_id = ctx.user, %query, %variant, results = items.len(), "Showing search results");
                session.store_results(variant, query, items);
                let (text, keyboard) = ui_builder::results_page(&session, self.page_size, ctx.language_code);
                self.sessions.save(ctx.user, session, Utc::now());
                ctx.say(text, Some(keyboard)).await
            }
            SearchOutcome::Empty => {
                info!(user_id = ctx.user, %query, %variant, "Search returned no results");
                let text = ctx.t_args("search-no-results", &[("query", &query)]);
                self.await_query(ctx, session, variant);
                ctx.say(text, Some(ui_builder::menu_keyboard(ctx.language_code))).await
            }
            SearchOutcome::TransientFailure(reason) => {
                warn!(user_id = ctx.user, %query, %variant, %reason, "Search failed");
                self.await_query(ctx, session, variant);
                ctx.say(ctx.t("search-failed"), Some(ui_builder::menu_keyboard(ctx.language_code)))
                    .await
            }
        }
    }

    /// Go back to waiting for a query, keeping nothing from older results
    fn await_query(&self, ctx: &Ctx<'_>, mut session: Session, variant: SearchVariant) {
        session.mode = Mode::AwaitingQuery(variant);
        session.variant = variant;
        session.result_set.clear();
        session.page_index = 0;
        session.selected_item = None;
        self.sessions.save(ctx.user, session, Utc::now());
    }

    /// Drop only the stale selection and offer the current results again
    async fn stale_selection(&self, ctx: &Ctx<'_>, mut session: Session) -> Result<()> {
        session.clear_selection();
        session.page_index = clamp_page_index(session.result_set.len(), self.page_size, session.page_index);
        let (_, keyboard) = ui_builder::results_page(&session, self.page_size, ctx.language_code);
        self.sessions.save(ctx.user, session, Utc::now());
        ctx.say(ctx.t("selection-stale"), Some(keyboard)).await
    }

    async fn select(&self, ctx: &Ctx<'_>, mut session: Session, index: usize) -> Result<()> {
        let Some(item) = session.select(index).cloned() else {
            info!(
                user_id = ctx.user,
                index,
                results = session.result_set.len(),
                "Selection index no longer valid"
            );
            return self.stale_selection(ctx, session).await;
        };

        debug!(user_id = ctx.user, index, item_id = %item.id, "Item selected");
        self.sessions.save(ctx.user, session, Utc::now());
        let (text, keyboard) = ui_builder::item_card(&item, ctx.language_code);
        ctx.say(text, Some(keyboard)).await
    }

    async fn paginate(&self, ctx: &Ctx<'_>, mut session: Session, delta: i32) -> Result<()> {
        let len = session.result_set.len();
        let current = clamp_page_index(len, self.page_size, session.page_index);
        let target = shift_page(len, self.page_size, current, delta);

        session.clear_selection();
        session.mode = Mode::BrowsingResults;
        let unchanged = target == session.page_index;
        session.page_index = target;
        let (text, keyboard) = ui_builder::results_page(&session, self.page_size, ctx.language_code);
        self.sessions.save(ctx.user, session, Utc::now());

        if unchanged {
            // Already at the first/last page
            return Ok(());
        }
        ctx.show(text, keyboard).await
    }

    async fn back_to_results(&self, ctx: &Ctx<'_>, mut session: Session) -> Result<()> {
        if session.result_set.is_empty() {
            return self.search_again(ctx, session).await;
        }
        session.clear_selection();
        session.page_index = clamp_page_index(session.result_set.len(), self.page_size, session.page_index);
        let (text, keyboard) = ui_builder::results_page(&session, self.page_size, ctx.language_code);
        self.sessions.save(ctx.user, session, Utc::now());
        ctx.show(text, keyboard).await
    }

    /// Fail closed when the selection is missing: ask for a new search
    async fn search_again(&self, ctx: &Ctx<'_>, session: Session) -> Result<()> {
        let variant = session.variant;
        self.await_query(ctx, session, variant);
        ctx.say(ctx.t("session-stale"), Some(ui_builder::menu_keyboard(ctx.language_code)))
            .await
    }

    async fn fetch(&self, ctx: &Ctx<'_>, session: Session, format: MediaFormat) -> Result<()> {
        let Some(item) = session.selected_item.clone() else {
            return self.search_again(ctx, session).await;
        };

        if !self.admit(ctx).await? {
            return Ok(());
        }

        let format_label = ctx.t(match format {
            MediaFormat::Audio => "format-audio",
            MediaFormat::Video => "format-video",
        });
        ctx.say(
            ctx.t_args("fetch-in-progress", &[("title", &item.title), ("format", &format_label)]),
            None,
        )
        .await?;

        // Touch the session so a long download does not expire it
        self.sessions.save(ctx.user, session, Utc::now());

        let delivered = match self.searcher.fetch(&item.id, format).await {
            Ok(media) => {
                let upload = ctx
                    .gateway
                    .send_file(ctx.user, &media.path, &item.title, format)
                    .await;
                // The temporary file goes away here, uploaded or not
                drop(media);
                match upload {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(user_id = ctx.user, item_id = %item.id, error = %e, "Upload failed");
                        false
                    }
                }
            }
            Err(failure) => {
                warn!(user_id = ctx.user, item_id = %item.id, %format, error = %failure, "Fetch failed");
                false
            }
        };

        if delivered {
            info!(user_id = ctx.user, item_id = %item.id, %format, "Media delivered");
            return Ok(());
        }
        let (text, keyboard) = ui_builder::fetch_failed(&item, format, ctx.language_code);
        ctx.say(text, Some(keyboard)).await
    }

    async fn send_link(&self, ctx: &Ctx<'_>, session: Session) -> Result<()> {
        let Some(item) = session.selected_item.clone() else {
            return self.search_again(ctx, session).await;
        };
        self.sessions.save(ctx.user, session, Utc::now());
        ctx.say(
            ctx.t_args("item-link", &[("title", &item.title), ("url", &item.source_url)]),
            None,
        )
        .await
    }

    async fn add_to_playlist(&self, ctx: &Ctx<'_>, session: Session) -> Result<()> {
        let Some(item) = session.selected_item.clone() else {
            return self.search_again(ctx, session).await;
        };
        self.sessions.save(ctx.user, session, Utc::now());

        match self.playlists.add(ctx.user, PlaylistEntry::from(&item)) {
            AddOutcome::Added { len } => {
                debug!(user_id = ctx.user, item_id = %item.id, len, "Added to playlist");
                ctx.say(
                    ctx.t_args("playlist-added", &[("title", &item.title), ("count", &len.to_string())]),
                    None,
                )
                .await
            }
            AddOutcome::Duplicate => {
                ctx.say(ctx.t_args("playlist-duplicate", &[("title", &item.title)]), None)
                    .await
            }
        }
    }

    async fn add_draft_term(&self, ctx: &Ctx<'_>, mut session: Session, text: &str) -> Result<()> {
        match push_draft_term(&mut session.playlist_draft, text) {
            Ok(count) => {
                let term = session.playlist_draft.last().cloned().unwrap_or_default();
                self.sessions.save(ctx.user, session, Utc::now());
                ctx.say(
                    ctx.t_args("playlist-draft-added", &[("term", &term), ("count", &count.to_string())]),
                    Some(ui_builder::draft_keyboard(count, ctx.language_code)),
                )
                .await
            }
            Err(e) => {
                let draft_len = session.playlist_draft.len();
                self.sessions.save(ctx.user, session, Utc::now());
                let text = match e {
                    DraftError::Empty => ctx.t("playlist-draft-empty-term"),
                    DraftError::TooLong => ctx.t("playlist-draft-too-long"),
                    DraftError::Full => ctx.t_args(
                        "playlist-draft-full",
                        &[("max", &MAX_DRAFT_ENTRIES.to_string())],
                    ),
                };
                ctx.say(text, Some(ui_builder::draft_keyboard(draft_len, ctx.language_code)))
                    .await
            }
        }
    }

    async fn finalize(&self, ctx: &Ctx<'_>, session: Session) -> Result<()> {
        if session.playlist_draft.is_empty() {
            self.sessions.save(ctx.user, session, Utc::now());
            return ctx
                .say(
                    ctx.t("playlist-nothing-to-finalize"),
                    Some(ui_builder::draft_keyboard(0, ctx.language_code)),
                )
                .await;
        }

        if !self.admit(ctx).await? {
            return Ok(());
        }

        let terms = session.playlist_draft.clone();
        ctx.say(ctx.t_args("playlist-resolving", &[("count", &terms.len().to_string())]), None)
            .await?;

        let searcher = &self.searcher;
        let limiter = &self.limiter;
        let user = ctx.user;
        // The first lookup was admitted above; every further one pays its own way
        let mut prepaid = true;
        let report = playlist::finalize(&terms, |term| {
            let admitted = std::mem::take(&mut prepaid) || limiter.is_allowed(user);
            async move {
                if !admitted {
                    return TermLookup::RateLimited;
                }
                match normalize_query(&term) {
                    Ok(query) => searcher.search_limited(SearchVariant::Plain, &query, 1).await.into(),
                    Err(_) => SearchOutcome::Empty.into(),
                }
            }
        })
        .await;

        // Draft is consumed either way
        self.sessions.reset(ctx.user);

        let mut summary = ui_builder::finalize_summary(
            report.requested,
            report.resolved,
            &report.failures,
            ctx.language_code,
        );
        if report.playlist.is_empty() {
            summary.push_str("\n\n");
            summary.push_str(&ctx.t("playlist-none-resolved"));
            return ctx.say(summary, Some(ui_builder::main_menu(ctx.language_code).1)).await;
        }

        self.playlists.replace(ctx.user, report.playlist.clone());
        ctx.say(summary, None).await?;
        let (text, keyboard) = ui_builder::playlist_view(Some(&report.playlist), ctx.language_code);
        ctx.say(text, Some(keyboard)).await
    }

    async fn show_playlist(&self, ctx: &Ctx<'_>) -> Result<()> {
        let playlist = self.playlists.get(ctx.user);
        let (text, keyboard) = ui_builder::playlist_view(playlist.as_ref(), ctx.language_code);
        ctx.show(text, keyboard).await
    }

    async fn clear_playlist(&self, ctx: &Ctx<'_>) -> Result<()> {
        let key = if self.playlists.clear(ctx.user) {
            "playlist-cleared"
        } else {
            "playlist-empty"
        };
        ctx.show(ctx.t(key), ui_builder::menu_keyboard(ctx.language_code)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/start"), Some(Command::Start));
        assert_eq!(parse_command("/menu"), Some(Command::Start));
        assert_eq!(parse_command("/start@WolfMusicBot"), Some(Command::Start));
        assert_eq!(parse_command("  /HELP please"), Some(Command::Help));
        assert_eq!(parse_command("/playlist"), Some(Command::Playlist));
        assert_eq!(parse_command("/dance"), Some(Command::Unknown));
        assert_eq!(parse_command("Bad Bunny"), None);
        assert_eq!(parse_command(""), None);
    }
}

//! # Callback Action Module
//!
//! Every inline button carries an [`Action`] encoded as a short token. The
//! token is only decoded at the gateway boundary, so the dialogue layer
//! works with the tagged enum and never splits strings itself.
//!
//! Token grammar (colon separated, well under Telegram's 64-byte limit):
//!
//! | Action               | Token            |
//! |----------------------|------------------|
//! | `ChooseMode(mode)`   | `mode:<mode>`    |
//! | `Select(i)`          | `sel:<i>`        |
//! | `Paginate(d)`        | `pg:<d>`         |
//! | `Fetch(format)`      | `get:<format>`   |
//! | `Link`               | `link`           |
//! | `AddToPlaylist`      | `pl:add`         |
//! | `Finalize`           | `pl:done`        |
//! | `ShowPlaylist`       | `pl:show`        |
//! | `ClearPlaylist`      | `pl:clear`       |
//! | `Back`               | `back`           |
//! | `BackToMenu`         | `menu`           |
//! | `Noop`               | `noop`           |

use std::fmt;
use std::str::FromStr;

use crate::media::{MediaFormat, SearchVariant};

/// Callback data size limit imposed by Telegram
pub const MAX_TOKEN_BYTES: usize = 64;

/// Top-level activities offered by the main menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuMode {
    Search,
    Karaoke,
    Discography,
    Albums,
    PlaylistBuilder,
}

impl MenuMode {
    pub const ALL: [MenuMode; 5] = [
        MenuMode::Search,
        MenuMode::Karaoke,
        MenuMode::Discography,
        MenuMode::Albums,
        MenuMode::PlaylistBuilder,
    ];

    /// Search variant behind this mode; `None` for the playlist builder
    pub fn search_variant(&self) -> Option<SearchVariant> {
        match self {
            MenuMode::Search => Some(SearchVariant::Plain),
            MenuMode::Karaoke => Some(SearchVariant::Karaoke),
            MenuMode::Discography => Some(SearchVariant::Discography),
            MenuMode::Albums => Some(SearchVariant::Album),
            MenuMode::PlaylistBuilder => None,
        }
    }

    fn token(&self) -> &'static str {
        match self {
            MenuMode::Search => "search",
            MenuMode::Karaoke => "karaoke",
            MenuMode::Discography => "discography",
            MenuMode::Albums => "albums",
            MenuMode::PlaylistBuilder => "playlist",
        }
    }

    fn from_token(token: &str) -> Option<Self> {
        MenuMode::ALL.into_iter().find(|mode| mode.token() == token)
    }
}

/// A user action carried by an inline button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ChooseMode(MenuMode),
    Select(usize),
    Paginate(i32),
    Fetch(MediaFormat),
    Link,
    AddToPlaylist,
    Finalize,
    ShowPlaylist,
    ClearPlaylist,
    Back,
    BackToMenu,
    Noop,
}

/// A callback token that does not decode to any known action
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized callback token: {token:?}")]
pub struct ActionParseError {
    pub token: String,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::ChooseMode(mode) => write!(f, "mode:{}", mode.token()),
            Action::Select(index) => write!(f, "sel:{index}"),
            Action::Paginate(delta) => write!(f, "pg:{delta}"),
            Action::Fetch(format) => write!(f, "get:{}", format.as_str()),
            Action::Link => f.write_str("link"),
            Action::AddToPlaylist => f.write_str("pl:add"),
            Action::Finalize => f.write_str("pl:done"),
            Action::ShowPlaylist => f.write_str("pl:show"),
            Action::ClearPlaylist => f.write_str("pl:clear"),
            Action::Back => f.write_str("back"),
            Action::BackToMenu => f.write_str("menu"),
            Action::Noop => f.write_str("noop"),
        }
    }
}

impl FromStr for Action {
    type Err = ActionParseError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let err = || ActionParseError {
            token: token.to_string(),
        };

        if token.len() > MAX_TOKEN_BYTES {
            return Err(err());
        }

        let (head, arg) = match token.split_once(':') {
            Some((head, arg)) => (head, Some(arg)),
            None => (token, None),
        };

        let action = match (head, arg) {
            ("mode", Some(mode)) => Action::ChooseMode(MenuMode::from_token(mode).ok_or_else(err)?),
            ("sel", Some(index)) => Action::Select(index.parse().map_err(|_| err())?),
            ("pg", Some(delta)) => Action::Paginate(delta.parse().map_err(|_| err())?),
            ("get", Some("audio")) => Action::Fetch(MediaFormat::Audio),
            ("get", Some("video")) => Action::Fetch(MediaFormat::Video),
            ("pl", Some("add")) => Action::AddToPlaylist,
            ("pl", Some("done")) => Action::Finalize,
            ("pl", Some("show")) => Action::ShowPlaylist,
            ("pl", Some("clear")) => Action::ClearPlaylist,
            ("link", None) => Action::Link,
            ("back", None) => Action::Back,
            ("menu", None) => Action::BackToMenu,
            ("noop", None) => Action::Noop,
            _ => return Err(err()),
        };
        Ok(action)
    }
}

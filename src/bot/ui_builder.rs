//! UI Builder module for creating keyboards and formatting messages

use crate::action::{Action, MenuMode};
use crate::localization::{t_args_lang, t_lang};
use crate::media::{MediaFormat, MediaItem, Playlist};
use crate::pagination::page;
use crate::playlist::TermFailure;
use crate::session::Session;

use super::gateway::{Button, Keyboard};

/// Longest button label before truncation
pub const MAX_LABEL_CHARS: usize = 55;

const ITEM_EMOJIS: [&str; 5] = ["🎵", "🎸", "🎹", "🎺", "🎻"];

/// Truncate on a character boundary, adding an ellipsis when shortened
pub fn truncate_label(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

fn menu_label(mode: MenuMode, language_code: Option<&str>) -> String {
    let key = match mode {
        MenuMode::Search => "menu-search",
        MenuMode::Karaoke => "menu-karaoke",
        MenuMode::Discography => "menu-discography",
        MenuMode::Albums => "menu-albums",
        MenuMode::PlaylistBuilder => "menu-playlist-builder",
    };
    t_lang(key, language_code)
}

/// Single "back to menu" row
pub fn menu_keyboard(language_code: Option<&str>) -> Keyboard {
    vec![vec![Button::new(t_lang("button-menu", language_code), Action::BackToMenu)]]
}

/// Main menu text and keyboard
pub fn main_menu(language_code: Option<&str>) -> (String, Keyboard) {
    let keyboard = vec![
        vec![
            Button::new(menu_label(MenuMode::Search, language_code), Action::ChooseMode(MenuMode::Search)),
            Button::new(menu_label(MenuMode::Karaoke, language_code), Action::ChooseMode(MenuMode::Karaoke)),
        ],
        vec![
            Button::new(
                menu_label(MenuMode::Discography, language_code),
                Action::ChooseMode(MenuMode::Discography),
            ),
            Button::new(menu_label(MenuMode::Albums, language_code), Action::ChooseMode(MenuMode::Albums)),
        ],
        vec![Button::new(
            menu_label(MenuMode::PlaylistBuilder, language_code),
            Action::ChooseMode(MenuMode::PlaylistBuilder),
        )],
        vec![Button::new(t_lang("menu-my-playlist", language_code), Action::ShowPlaylist)],
    ];
    (t_lang("menu-prompt", language_code), keyboard)
}

/// Welcome banner shown on /start
pub fn welcome_text(language_code: Option<&str>) -> String {
    format!(
        "{}\n\n{}",
        t_lang("welcome-title", language_code),
        t_lang("welcome-description", language_code)
    )
}

/// Prompt shown after the user picks a menu entry
pub fn mode_prompt(mode: MenuMode, language_code: Option<&str>) -> (String, Keyboard) {
    let key = match mode {
        MenuMode::Search => "prompt-search",
        MenuMode::Karaoke => "prompt-karaoke",
        MenuMode::Discography => "prompt-discography",
        MenuMode::Albums => "prompt-albums",
        MenuMode::PlaylistBuilder => "prompt-playlist",
    };
    let keyboard = match mode {
        MenuMode::PlaylistBuilder => draft_keyboard(0, language_code),
        _ => menu_keyboard(language_code),
    };
    (t_lang(key, language_code), keyboard)
}

/// Keyboard shown while a playlist draft is open
pub fn draft_keyboard(draft_len: usize, language_code: Option<&str>) -> Keyboard {
    let mut rows = Vec::new();
    if draft_len > 0 {
        rows.push(vec![Button::new(
            t_args_lang("button-finish", &[("count", &draft_len.to_string())], language_code),
            Action::Finalize,
        )]);
    }
    rows.push(vec![Button::new(t_lang("button-menu", language_code), Action::BackToMenu)]);
    rows
}

/// Render the current results page of `session`
pub fn results_page(session: &Session, page_size: usize, language_code: Option<&str>) -> (String, Keyboard) {
    let current = page(&session.result_set, session.page_index, page_size);
    let query = session.query.as_deref().unwrap_or("");

    let mut text = t_args_lang(
        "search-results-title",
        &[
            ("query", query),
            ("page", &(current.index + 1).to_string()),
            ("pages", &current.total_pages.max(1).to_string()),
        ],
        language_code,
    );
    text.push_str("\n\n");

    let mut keyboard: Keyboard = Vec::new();
    for (i, item) in current.items.iter().enumerate() {
        let index = current.offset + i;
        let emoji = ITEM_EMOJIS[index % ITEM_EMOJIS.len()];
        let uploader = if item.uploader.is_empty() {
            String::new()
        } else {
            format!(" · {}", item.uploader)
        };
        text.push_str(&format!(
            "{}. {}{} ({})\n",
            index + 1,
            item.title,
            uploader,
            item.display_duration()
        ));
        keyboard.push(vec![Button::new(
            format!("{emoji} {}", truncate_label(&item.title, MAX_LABEL_CHARS)),
            Action::Select(index),
        )]);
    }

    if current.total_pages > 1 {
        let mut nav = Vec::new();
        if current.has_prev {
            nav.push(Button::new(t_lang("button-prev", language_code), Action::Paginate(-1)));
        }
        nav.push(Button::new(
            format!("{}/{}", current.index + 1, current.total_pages),
            Action::Noop,
        ));
        if current.has_next {
            nav.push(Button::new(t_lang("button-next", language_code), Action::Paginate(1)));
        }
        keyboard.push(nav);
    }
    keyboard.push(vec![Button::new(t_lang("button-menu", language_code), Action::BackToMenu)]);

    (text.trim_end().to_string(), keyboard)
}

/// Card for the selected item with its follow-up actions
pub fn item_card(item: &MediaItem, language_code: Option<&str>) -> (String, Keyboard) {
    let duration = item.display_duration();
    let text = t_args_lang(
        "item-details",
        &[
            ("title", &item.title),
            ("uploader", &item.uploader),
            ("duration", &duration),
            ("url", &item.source_url),
        ],
        language_code,
    );
    (text, item_keyboard(language_code))
}

fn item_keyboard(language_code: Option<&str>) -> Keyboard {
    vec![
        vec![
            Button::new(t_lang("button-audio", language_code), Action::Fetch(MediaFormat::Audio)),
            Button::new(t_lang("button-video", language_code), Action::Fetch(MediaFormat::Video)),
        ],
        vec![
            Button::new(t_lang("button-link", language_code), Action::Link),
            Button::new(t_lang("button-add-playlist", language_code), Action::AddToPlaylist),
        ],
        vec![
            Button::new(t_lang("button-back", language_code), Action::Back),
            Button::new(t_lang("button-menu", language_code), Action::BackToMenu),
        ],
    ]
}

/// Fetch failure notice with retry and raw-link fallback
pub fn fetch_failed(item: &MediaItem, format: MediaFormat, language_code: Option<&str>) -> (String, Keyboard) {
    let text = t_args_lang(
        "fetch-failed",
        &[("title", &item.title), ("url", &item.source_url)],
        language_code,
    );
    let keyboard = vec![
        vec![Button::new(t_lang("button-retry", language_code), Action::Fetch(format))],
        vec![
            Button::new(t_lang("button-back", language_code), Action::Back),
            Button::new(t_lang("button-menu", language_code), Action::BackToMenu),
        ],
    ];
    (text, keyboard)
}

fn format_playlist_entries(playlist: &Playlist) -> String {
    playlist
        .entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let title = truncate_label(&entry.title, MAX_LABEL_CHARS);
            if entry.artist.is_empty() {
                format!("{}. {}\n   {}", i + 1, title, entry.url)
            } else {
                let artist = truncate_label(&entry.artist, MAX_LABEL_CHARS);
                format!("{}. {} · {}\n   {}", i + 1, title, artist, entry.url)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The user's playlist, or a hint when there is none
pub fn playlist_view(playlist: Option<&Playlist>, language_code: Option<&str>) -> (String, Keyboard) {
    match playlist.filter(|p| !p.is_empty()) {
        Some(playlist) => {
            let text = format!(
                "{}\n\n{}",
                t_args_lang("playlist-title", &[("count", &playlist.len().to_string())], language_code),
                format_playlist_entries(playlist)
            );
            let keyboard = vec![
                vec![Button::new(t_lang("button-clear-playlist", language_code), Action::ClearPlaylist)],
                vec![Button::new(t_lang("button-menu", language_code), Action::BackToMenu)],
            ];
            (text, keyboard)
        }
        None => (t_lang("playlist-empty", language_code), menu_keyboard(language_code)),
    }
}

/// Summary of a finalized draft
pub fn finalize_summary(
    requested: usize,
    resolved: usize,
    failures: &[TermFailure],
    language_code: Option<&str>,
) -> String {
    let mut text = t_args_lang(
        "playlist-finalized",
        &[
            ("requested", &requested.to_string()),
            ("resolved", &resolved.to_string()),
        ],
        language_code,
    );
    for failure in failures {
        text.push('\n');
        text.push_str(&t_args_lang(
            "playlist-term-failed",
            &[
                ("term", &truncate_label(&failure.term, MAX_LABEL_CHARS)),
                ("reason", &t_lang(failure.kind.message_key(), language_code)),
            ],
            language_code,
        ));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SearchVariant;
    use chrono::Utc;

    fn items(n: usize) -> Vec<MediaItem> {
        (0..n)
            .map(|i| MediaItem {
                id: format!("id{i}"),
                title: format!("Song {i}"),
                uploader: "Band".to_string(),
                duration_seconds: Some(180),
                source_url: format!("https://www.youtube.com/watch?v=id{i}"),
            })
            .collect()
    }

    #[test]
    fn test_truncate_label_respects_char_boundaries() {
        assert_eq!(truncate_label("short", 10), "short");
        let long = "ñ".repeat(60);
        let truncated = truncate_label(&long, 55);
        assert_eq!(truncated.chars().count(), 55);
        assert!(truncated.ends_with('…'));
    }

    #[test]
    fn test_results_page_single_page_has_no_navigation() {
        let mut session = Session::new(Utc::now());
        session.store_results(SearchVariant::Plain, "Bad Bunny".to_string(), items(5));

        let (_, keyboard) = results_page(&session, 5, None);
        // 5 items + menu row
        assert_eq!(keyboard.len(), 6);
        assert_eq!(keyboard[2][0].action, Action::Select(2));
        assert_eq!(keyboard[5][0].action, Action::BackToMenu);
    }

    #[test]
    fn test_results_page_navigation_row() {
        let mut session = Session::new(Utc::now());
        session.store_results(SearchVariant::Plain, "q".to_string(), items(12));
        session.page_index = 1;

        let (_, keyboard) = results_page(&session, 5, None);
        assert_eq!(keyboard[0][0].action, Action::Select(5));
        let nav = &keyboard[5];
        assert_eq!(nav[0].action, Action::Paginate(-1));
        assert_eq!(nav[1].action, Action::Noop);
        assert_eq!(nav[2].action, Action::Paginate(1));
    }

    #[test]
    fn test_item_card_offers_fetch_and_playlist_actions() {
        let item = &items(1)[0];
        let (text, keyboard) = item_card(item, None);
        assert!(text.contains("Song 0"));
        let actions: Vec<Action> = keyboard.iter().flatten().map(|b| b.action).collect();
        assert!(actions.contains(&Action::Fetch(MediaFormat::Audio)));
        assert!(actions.contains(&Action::Fetch(MediaFormat::Video)));
        assert!(actions.contains(&Action::AddToPlaylist));
        assert!(actions.contains(&Action::Back));
    }
}

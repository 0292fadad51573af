//! # Localization Tests
//!
//! Message retrieval, argument substitution and language fallback for the
//! bundled Fluent resources.

use music_finder_bot::localization::LocalizationManager;
use std::collections::HashMap;

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_localization() -> LocalizationManager {
        LocalizationManager::new().expect("Failed to create localization manager")
    }

    #[test]
    fn test_get_message_existing_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("help-text", "en", None);
        assert!(message.contains("/playlist"));
        assert!(message.contains("/cancel"));
    }

    #[test]
    fn test_get_message_nonexistent_key() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("nonexistent-key", "en", None);
        assert!(message.starts_with("Missing translation:"));
    }

    #[test]
    fn test_unsupported_language_falls_back_to_english() {
        let manager = setup_localization();

        let fallback = manager.get_message_in_language("menu-prompt", "de", None);
        let english = manager.get_message_in_language("menu-prompt", "en", None);
        assert_eq!(fallback, english);
        assert!(!manager.is_language_supported("de"));
    }

    #[test]
    fn test_regional_language_codes() {
        let manager = setup_localization();

        assert!(manager.is_language_supported("es-MX"));
        assert!(manager.is_language_supported("en_GB"));
        assert_eq!(
            manager.get_message_in_language("menu-prompt", "es-MX", None),
            manager.get_message_in_language("menu-prompt", "es", None)
        );
    }

    #[test]
    fn test_spanish_differs_from_english() {
        let manager = setup_localization();

        let spanish = manager.get_message_in_language("session-expired", "es", None);
        let english = manager.get_message_in_language("session-expired", "en", None);
        assert_ne!(spanish, english);
    }

    #[test]
    fn test_get_message_with_args() {
        let manager = setup_localization();

        let mut args = HashMap::new();
        args.insert("seconds", "42");

        let message = manager.get_message_in_language("rate-limited", "en", Some(&args));
        assert!(message.contains("42 seconds"));
        // No Unicode isolation marks around placeables
        assert!(!message.contains('\u{2068}'));
    }

    #[test]
    fn test_get_message_missing_args() {
        let manager = setup_localization();

        let message = manager.get_message_in_language("rate-limited", "en", None);
        assert!(!message.is_empty());
    }

    #[test]
    fn test_every_english_key_exists_in_spanish() {
        let manager = setup_localization();
        let keys = [
            "welcome-title",
            "menu-prompt",
            "help-text",
            "prompt-search",
            "prompt-playlist",
            "button-finish",
            "search-results-title",
            "rate-limited",
            "busy-wait",
            "session-expired",
            "selection-stale",
            "fetch-failed",
            "playlist-finalized",
            "playlist-reason-not-found",
            "playlist-reason-duplicate",
            "playlist-reason-failed",
            "playlist-reason-rate-limited",
            "voice-failed",
            "error-generic",
        ];
        for key in keys {
            let message = manager.get_message_in_language(key, "es", None);
            assert!(!message.starts_with("Missing"), "missing key {key}");
        }
    }

    #[test]
    fn test_convenience_functions() {
        music_finder_bot::localization::init_localization()
            .expect("Failed to initialize localization");

        let message = music_finder_bot::localization::t_lang("menu-prompt", None);
        assert!(!message.is_empty());

        let args = vec![("title", "Imagine"), ("count", "3")];
        let message_with_args =
            music_finder_bot::localization::t_args_lang("playlist-added", &args, Some("en"));
        assert!(message_with_args.contains("Imagine"));
        assert!(message_with_args.contains('3'));
    }
}

//! # Localization Module
//!
//! Fluent bundles for every user-facing string. The language comes from the
//! Telegram user's `language_code`; anything unsupported falls back to
//! English.

use anyhow::Result;
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use unic_langid::LanguageIdentifier;

/// Fallback language
pub const DEFAULT_LANGUAGE: &str = "en";

const RESOURCES: [(&str, &str); 2] = [
    ("en", include_str!("../locales/en/main.ftl")),
    ("es", include_str!("../locales/es/main.ftl")),
];

/// Localization manager for the bot
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
}

impl LocalizationManager {
    /// Create a new localization manager with every bundled language
    pub fn new() -> Result<Self> {
        let mut bundles = HashMap::new();
        for (code, source) in RESOURCES {
            let locale: LanguageIdentifier = code.parse()?;
            bundles.insert(code.to_string(), Self::create_bundle(locale, source)?);
        }
        Ok(Self { bundles })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(locale: LanguageIdentifier, source: &str) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the Unicode isolation marks as garbage
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow::anyhow!("Invalid Fluent resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow::anyhow!("Duplicate Fluent messages: {errors:?}"))?;
        Ok(bundle)
    }

    /// Whether a language code maps to a bundled language
    pub fn is_language_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(&Self::primary_subtag(language))
    }

    fn primary_subtag(language: &str) -> String {
        language
            .split(['-', '_'])
            .next()
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_lowercase()
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let code = Self::primary_subtag(language);
        let bundle = match self
            .bundles
            .get(&code)
            .or_else(|| self.bundles.get(DEFAULT_LANGUAGE))
        {
            Some(bundle) => bundle,
            None => return format!("Missing translation: {key}"),
        };

        let msg = match bundle.get_message(key) {
            Some(msg) => msg,
            None if code != DEFAULT_LANGUAGE => {
                return self.get_message_in_language(key, DEFAULT_LANGUAGE, args)
            }
            None => return format!("Missing translation: {key}"),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {key}"),
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned()
    }

    /// Get a localized message, `None` meaning the default language
    pub fn get_message(&self, key: &str, language: Option<&str>) -> String {
        self.get_message_in_language(key, language.unwrap_or(DEFAULT_LANGUAGE), None)
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Initialize the global localization manager
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Get the global localization manager, initializing it on first use
fn manager() -> Option<&'static LocalizationManager> {
    if LOCALIZATION_MANAGER.get().is_none() {
        if let Err(e) = init_localization() {
            tracing::error!(error = %e, "Failed to initialize localization");
        }
    }
    LOCALIZATION_MANAGER.get()
}

/// Localized message for `key` in `language` (English when `None`)
pub fn t_lang(key: &str, language: Option<&str>) -> String {
    match manager() {
        Some(manager) => manager.get_message(key, language),
        None => key.to_string(),
    }
}

/// Localized message for `key` with named arguments
pub fn t_args_lang(key: &str, args: &[(&str, &str)], language: Option<&str>) -> String {
    let args_map: HashMap<&str, &str> = args.iter().cloned().collect();
    match manager() {
        Some(manager) => {
            manager.get_message_in_language(key, language.unwrap_or(DEFAULT_LANGUAGE), Some(&args_map))
        }
        None => key.to_string(),
    }
}

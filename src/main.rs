use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tracing::{debug, info};

use music_finder_bot::bot::{self, MusicBot};
use music_finder_bot::catalog::{MediaCatalog, YtDlpCatalog};
use music_finder_bot::config::BotConfig;
use music_finder_bot::localization::init_localization;
use music_finder_bot::speech::{SpeechToText, WhisperTranscriber};

/// How often expired sessions and idle rate-limit histories are dropped
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_tracing();
    info!("Starting Music Finder Telegram Bot");

    let config = BotConfig::from_env()?;
    init_localization()?;

    std::fs::create_dir_all(&config.download_dir)?;
    info!(download_dir = %config.download_dir.display(), "Using download directory");

    let catalog: Arc<dyn MediaCatalog> = Arc::new(YtDlpCatalog::new(config.download_dir.clone()));
    let transcriber: Option<Arc<dyn SpeechToText>> = match config.speech.clone() {
        Some(speech) => {
            info!(api_url = %speech.api_url, "Voice transcription enabled");
            Some(Arc::new(WhisperTranscriber::new(speech)))
        }
        None => {
            info!("OPENAI_API_KEY not set, voice transcription disabled");
            None
        }
    };

    let engine = Arc::new(MusicBot::new(&config, catalog, transcriber));

    // Periodic cleanup of per-user state
    {
        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                let (sessions, limiter) = engine.sweep();
                if sessions > 0 || limiter > 0 {
                    debug!(sessions, limiter, "Swept expired state");
                }
            }
        });
    }

    let bot = Bot::new(config.bot_token.clone());

    info!("Bot initialized, starting dispatcher");

    let handler = dptree::entry()
        .branch(Update::filter_message().endpoint({
            let engine = Arc::clone(&engine);
            move |bot: Bot, msg: Message| {
                let engine = Arc::clone(&engine);
                async move { bot::message_handler(bot, msg, engine).await }
            }
        }))
        .branch(Update::filter_callback_query().endpoint({
            let engine = Arc::clone(&engine);
            move |bot: Bot, q: CallbackQuery| {
                let engine = Arc::clone(&engine);
                async move { bot::callback_handler(bot, q, engine).await }
            }
        }));

    Dispatcher::builder(bot, handler)
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, error, warn};

use crate::localization::t_lang;

use super::dialogue_manager::MusicBot;
use super::gateway::{EventKind, IncomingEvent, TelegramGateway};

/// Largest voice note we bother downloading
pub const MAX_VOICE_BYTES: u32 = 20 * 1024 * 1024;

/// Download a Telegram file into memory
pub async fn download_file(bot: &Bot, file_id: teloxide::types::FileId) -> Result<Vec<u8>> {
    let file = bot.get_file(file_id).await?;
    let url = format!(
        "https://api.telegram.org/file/bot{}/{}",
        bot.token(),
        file.path
    );

    let response = reqwest::get(&url).await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}

/// Run an event through the engine and wait for it to finish
///
/// The dispatcher only hands a chat its next update once this returns, so
/// events from one chat are handled in arrival order. The work runs on its
/// own task so a panic in the engine is logged instead of unwinding into
/// the dispatcher.
pub async fn dispatch_event(bot: Bot, engine: Arc<MusicBot>, event: IncomingEvent) {
    let user_id = event.user_id;
    let handle = tokio::spawn(async move {
        let gateway = TelegramGateway::new(bot);
        engine.handle_event(&gateway, event).await;
    });
    if let Err(e) = handle.await {
        error!(user_id, error = %e, "Event task aborted");
    }
}

pub async fn message_handler(bot: Bot, msg: Message, engine: Arc<MusicBot>) -> Result<()> {
    // Extract user's language code from Telegram
    let language_code = msg
        .from
        .as_ref()
        .and_then(|user| user.language_code.clone());
    let user_id = msg.chat.id.0;

    let kind = if let Some(text) = msg.text() {
        EventKind::Text(text.to_string())
    } else if let Some(voice) = msg.voice() {
        debug!(user_id, duration = ?voice.duration, "Received voice message from user");
        if voice.file.size > MAX_VOICE_BYTES {
            bot.send_message(msg.chat.id, t_lang("voice-failed", language_code.as_deref()))
                .await?;
            return Ok(());
        }
        match download_file(&bot, voice.file.id.clone()).await {
            Ok(audio) => EventKind::Voice(audio),
            Err(e) => {
                warn!(user_id, error = %e, "Failed to download voice message");
                bot.send_message(msg.chat.id, t_lang("voice-failed", language_code.as_deref()))
                    .await?;
                return Ok(());
            }
        }
    } else {
        debug!(user_id, "Unsupported message type");
        bot.send_message(msg.chat.id, t_lang("help-text", language_code.as_deref()))
            .await?;
        return Ok(());
    };

    dispatch_event(
        bot,
        engine,
        IncomingEvent {
            user_id,
            language_code,
            kind,
        },
    )
    .await;
    Ok(())
}

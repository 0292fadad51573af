//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, warn};

use super::dialogue_manager::MusicBot;
use super::gateway::{EventKind, IncomingEvent, MessageRef};
use super::message_handler::dispatch_event;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: teloxide::types::CallbackQuery,
    engine: Arc<MusicBot>,
) -> Result<()> {
    debug!(user_id = %q.from.id, "Received callback query from user");

    // Stop the client's loading spinner right away
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!(user_id = %q.from.id, error = %e, "Failed to answer callback query");
    }

    let Some(token) = q.data.clone() else {
        return Ok(());
    };

    let message = q.message.as_ref().map(|msg| MessageRef {
        chat_id: msg.chat().id.0,
        message_id: msg.id().0,
    });
    // Sessions are keyed by chat, same as for text messages
    let user_id = message
        .map(|m| m.chat_id)
        .unwrap_or(q.from.id.0 as i64);

    dispatch_event(
        bot,
        engine,
        IncomingEvent {
            user_id,
            language_code: q.from.language_code.clone(),
            kind: EventKind::Callback { token, message },
        },
    )
    .await;
    Ok(())
}

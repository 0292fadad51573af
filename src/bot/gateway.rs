//! Messaging gateway: the boundary between the dialogue core and Telegram.

use async_trait::async_trait;
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, MessageId};
use tracing::debug;

use crate::action::Action;
use crate::errors::GatewayError;
use crate::media::MediaFormat;
use crate::session::UserId;

/// Reference to a message the bot sent earlier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageRef {
    pub chat_id: i64,
    pub message_id: i32,
}

/// One inline button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, action: Action) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons
pub type Keyboard = Vec<Vec<Button>>;

/// What the user did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Text(String),
    /// A button press; `message` is the message carrying the button
    Callback {
        token: String,
        message: Option<MessageRef>,
    },
    Voice(Vec<u8>),
}

/// An event delivered by the platform for one user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingEvent {
    pub user_id: UserId,
    /// Telegram `language_code` of the sender, if known
    pub language_code: Option<String>,
    pub kind: EventKind,
}

/// Outbound side of the chat platform
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn send(
        &self,
        user: UserId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, GatewayError>;

    async fn edit(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError>;

    async fn send_file(
        &self,
        user: UserId,
        path: &Path,
        caption: &str,
        format: MediaFormat,
    ) -> Result<(), GatewayError>;
}

/// Convert a keyboard into Telegram's inline markup
pub fn to_inline_markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.to_string()))
            .collect::<Vec<_>>()
    }))
}

/// Gateway backed by a teloxide [`Bot`]
#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
}

impl TelegramGateway {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessagingGateway for TelegramGateway {
    async fn send(
        &self,
        user: UserId,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<MessageRef, GatewayError> {
        let request = self.bot.send_message(ChatId(user), text);
        let sent = match keyboard {
            Some(keyboard) => request.reply_markup(to_inline_markup(&keyboard)).await?,
            None => request.await?,
        };
        Ok(MessageRef {
            chat_id: sent.chat.id.0,
            message_id: sent.id.0,
        })
    }

    async fn edit(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<Keyboard>,
    ) -> Result<(), GatewayError> {
        let request = self
            .bot
            .edit_message_text(ChatId(message.chat_id), MessageId(message.message_id), text);
        match keyboard {
            Some(keyboard) => request.reply_markup(to_inline_markup(&keyboard)).await?,
            None => request.await?,
        };
        Ok(())
    }

    async fn send_file(
        &self,
        user: UserId,
        path: &Path,
        caption: &str,
        format: MediaFormat,
    ) -> Result<(), GatewayError> {
        debug!(user_id = user, path = %path.display(), %format, "Uploading file");
        let file = InputFile::file(path.to_path_buf());
        match format {
            MediaFormat::Audio => {
                self.bot
                    .send_audio(ChatId(user), file)
                    .caption(caption)
                    .await?;
            }
            MediaFormat::Video => {
                self.bot
                    .send_video(ChatId(user), file)
                    .caption(caption)
                    .await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_markup_uses_action_tokens() {
        let keyboard = vec![
            vec![Button::new("One", Action::Select(0)), Button::new("Two", Action::Select(1))],
            vec![Button::new("Menu", Action::BackToMenu)],
        ];
        let markup = to_inline_markup(&keyboard);

        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1][0].text, "Menu");
    }
}

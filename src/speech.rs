//! # Speech-to-Text Module
//!
//! Optional voice-note support. The bot only depends on the
//! [`SpeechToText`] trait; [`WhisperTranscriber`] talks to any
//! Whisper-compatible transcription endpoint.

use async_trait::async_trait;
use tracing::info;

use crate::config::SpeechConfig;
use crate::errors::TranscriptionError;

/// Transcription backend
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe an audio clip; `locale` is a hint such as `"es"`.
    async fn transcribe(
        &self,
        audio: &[u8],
        locale: Option<&str>,
    ) -> Result<String, TranscriptionError>;
}

/// Whisper HTTP API client
#[derive(Debug, Clone)]
pub struct WhisperTranscriber {
    client: reqwest::Client,
    config: SpeechConfig,
}

impl WhisperTranscriber {
    pub fn new(config: SpeechConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }
}

/// Two-letter language hint accepted by Whisper (`"es-MX"` → `"es"`)
pub fn language_hint(locale: &str) -> Option<String> {
    let primary = locale.split(['-', '_']).next()?.trim().to_lowercase();
    if primary.len() == 2 && primary.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(primary)
    } else {
        None
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio: &[u8],
        locale: Option<&str>,
    ) -> Result<String, TranscriptionError> {
        info!(bytes = audio.len(), "Transcribing voice note");

        // Telegram voice notes are OGG/Opus
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("voice.ogg")
            .mime_str("audio/ogg")?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "text")
            .part("file", part);
        if let Some(language) = locale.and_then(language_hint) {
            form = form.text("language", language);
        }

        let resp = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body: String = resp.text().await.unwrap_or_default().chars().take(500).collect();
            return Err(TranscriptionError::Api { status, body });
        }

        let text = resp.text().await?.trim().to_string();
        if text.is_empty() {
            return Err(TranscriptionError::Empty);
        }
        info!(chars = text.len(), "Voice note transcribed");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_hint() {
        assert_eq!(language_hint("es-MX").as_deref(), Some("es"));
        assert_eq!(language_hint("EN"), Some("en".to_string()));
        assert_eq!(language_hint("pt_BR").as_deref(), Some("pt"));
        assert_eq!(language_hint(""), None);
        assert_eq!(language_hint("english"), None);
    }
}

//! Telegram Bot API transport

pub mod types;

use crate::runtime::{InboundContent, InboundMessage, Transport, TransportError};
use crate::state_machine::{ChatId, Keyboard};
use crate::store::{MediaKind, MediaRef};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use types::{ApiResponse, ReplyKeyboardMarkup, SendFile, SendMessage, SetWebhook, Update};

/// Bot API client
pub struct TelegramTransport {
    client: Client,
    base_url: String,
    token: String,
}

impl TelegramTransport {
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.base_url, self.token)
    }

    async fn call<P: Serialize + Sync>(&self, method: &str, payload: &P) -> Result<(), TransportError> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(payload)
            .send()
            .await
            .map_err(|e| request_error(method, e))?;
        check_response(method, response).await
    }

    /// Point the platform at our webhook endpoint
    pub async fn set_webhook(&self, url: &str) -> Result<(), TransportError> {
        self.call("setWebhook", &SetWebhook { url }).await
    }
}

fn request_error(method: &str, e: reqwest::Error) -> TransportError {
    // The URL carries the token
    let e = e.without_url();
    if e.is_timeout() {
        TransportError::Http(format!("{method}: request timeout: {e}"))
    } else if e.is_connect() {
        TransportError::Http(format!("{method}: connection failed: {e}"))
    } else {
        TransportError::Http(format!("{method}: request failed: {e}"))
    }
}

async fn check_response(method: &str, response: reqwest::Response) -> Result<(), TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Http(format!("{method}: failed to read response: {e}")))?;
    interpret(method, status, &body)
}

fn interpret(method: &str, status: reqwest::StatusCode, body: &str) -> Result<(), TransportError> {
    match serde_json::from_str::<ApiResponse>(body) {
        Ok(ApiResponse { ok: true, .. }) => Ok(()),
        Ok(ApiResponse { description, .. }) => Err(TransportError::Api {
            description: description.unwrap_or_else(|| format!("{method}: HTTP {status}")),
        }),
        Err(_) if status.is_success() => Ok(()),
        Err(_) => Err(TransportError::Http(format!("{method}: HTTP {status}"))),
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let payload = SendMessage {
            chat_id: chat.0,
            text,
            reply_markup: keyboard.map(ReplyKeyboardMarkup::from),
        };
        self.call("sendMessage", &payload).await
    }

    async fn send_media(&self, chat: ChatId, media: &MediaRef) -> Result<(), TransportError> {
        let (method, payload) = match media.kind {
            MediaKind::Photo => (
                "sendPhoto",
                SendFile {
                    chat_id: chat.0,
                    photo: Some(media.id.as_str()),
                    video: None,
                    sticker: None,
                },
            ),
            MediaKind::Video => (
                "sendVideo",
                SendFile {
                    chat_id: chat.0,
                    photo: None,
                    video: Some(media.id.as_str()),
                    sticker: None,
                },
            ),
        };
        self.call(method, &payload).await
    }

    async fn send_sticker(&self, chat: ChatId, sticker_id: &str) -> Result<(), TransportError> {
        let payload = SendFile {
            chat_id: chat.0,
            photo: None,
            video: None,
            sticker: Some(sticker_id),
        };
        self.call("sendSticker", &payload).await
    }

    async fn send_image(&self, chat: ChatId, png: Vec<u8>) -> Result<(), TransportError> {
        let part = Part::bytes(png)
            .file_name("progress.png")
            .mime_str("image/png")
            .map_err(|e| TransportError::Http(format!("sendPhoto: {e}")))?;
        let form = Form::new()
            .text("chat_id", chat.0.to_string())
            .part("photo", part);

        let response = self
            .client
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error("sendPhoto", e))?;
        check_response("sendPhoto", response).await
    }
}

/// Turn an update into an inbound message; `None` for anything the bot
/// does not handle
pub fn parse_update(update: Update) -> Option<InboundMessage> {
    let Some(message) = update.message else {
        tracing::debug!(update_id = update.update_id, "Ignoring non-message update");
        return None;
    };
    let chat_id = ChatId(message.chat.id);

    let content = if let Some(text) = message.text {
        InboundContent::Text(text)
    } else if let Some(largest) = message.photo.into_iter().max_by_key(types::PhotoSize::area) {
        InboundContent::Photo {
            file_id: largest.file_id,
        }
    } else if let Some(video) = message.video {
        InboundContent::Video {
            file_id: video.file_id,
        }
    } else {
        tracing::debug!(update_id = update.update_id, chat_id = %chat_id, "Ignoring unsupported message");
        return None;
    };

    Some(InboundMessage { chat_id, content })
}

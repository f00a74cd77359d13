//! Telegram Bot API wire types
//!
//! Only the fields the bot reads or writes are modelled; everything else in
//! an update is ignored by serde.

use crate::state_machine::Keyboard;
use serde::{Deserialize, Serialize};

// ============================================================================
// Inbound
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub photo: Vec<PhotoSize>,
    #[serde(default)]
    pub video: Option<Video>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: u32,
    pub height: u32,
}

impl PhotoSize {
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Video {
    pub file_id: String,
}

/// Envelope around every Bot API response
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Outbound
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyKeyboardMarkup>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendFile<'a> {
    pub chat_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetWebhook<'a> {
    pub url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyKeyboardMarkup {
    pub keyboard: Vec<Vec<KeyboardButton>>,
    pub resize_keyboard: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyboardButton {
    pub text: String,
}

impl From<&Keyboard> for ReplyKeyboardMarkup {
    fn from(kb: &Keyboard) -> Self {
        Self {
            keyboard: kb
                .rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|text| KeyboardButton { text: text.clone() })
                        .collect()
                })
                .collect(),
            resize_keyboard: true,
        }
    }
}

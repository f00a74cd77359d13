//! Trait abstractions for runtime I/O
//!
//! These traits enable testing the chat runtime with mock implementations.

use crate::state_machine::{ChatId, Keyboard};
use crate::store::{Day, MediaRef};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error: {description}")]
    Api { description: String },
}

/// Outbound side of the chat platform
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    /// Re-send a stored photo or video by its platform id
    async fn send_media(&self, chat: ChatId, media: &MediaRef) -> Result<(), TransportError>;

    async fn send_sticker(&self, chat: ChatId, sticker_id: &str) -> Result<(), TransportError>;

    /// Upload a freshly rendered PNG
    async fn send_image(&self, chat: ChatId, png: Vec<u8>) -> Result<(), TransportError>;
}

/// Renders per-day weight series into a PNG
pub trait ChartRenderer: Send + Sync {
    /// `None` when every series is empty
    fn render_progress(&self, series: &BTreeMap<Day, Vec<f64>>) -> Option<Vec<u8>>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        (**self).send_text(chat, text, keyboard).await
    }

    async fn send_media(&self, chat: ChatId, media: &MediaRef) -> Result<(), TransportError> {
        (**self).send_media(chat, media).await
    }

    async fn send_sticker(&self, chat: ChatId, sticker_id: &str) -> Result<(), TransportError> {
        (**self).send_sticker(chat, sticker_id).await
    }

    async fn send_image(&self, chat: ChatId, png: Vec<u8>) -> Result<(), TransportError> {
        (**self).send_image(chat, png).await
    }
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for Arc<T> {
    fn render_progress(&self, series: &BTreeMap<Day, Vec<f64>>) -> Option<Vec<u8>> {
        (**self).render_progress(series)
    }
}

//! Runtime for executing chats
//!
//! Each chat gets its own actor task; the registry routes inbound messages
//! to it, creating the actor on first contact.

mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use executor::ChatRuntime;
pub use traits::*;

use crate::chart::PngChartRenderer;
use crate::config::RestWindow;
use crate::state_machine::{ChatId, Event, Session};
use crate::store::{ExerciseStore, MediaRef};
use crate::telegram::TelegramTransport;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, RwLock};

/// Type alias for the production registry with concrete implementations
pub type ProductionRegistry = SessionRegistry<TelegramTransport, PngChartRenderer>;

/// A message received from the chat platform
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub chat_id: ChatId,
    pub content: InboundContent,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InboundContent {
    Text(String),
    Photo { file_id: String },
    Video { file_id: String },
}

impl InboundMessage {
    #[allow(dead_code)] // Used by tests
    pub fn text(chat_id: ChatId, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            content: InboundContent::Text(text.into()),
        }
    }

    pub fn into_event(self) -> Event {
        match self.content {
            InboundContent::Text(text) => Event::Text { text },
            InboundContent::Photo { file_id } => Event::Media {
                media: MediaRef::photo(file_id),
            },
            InboundContent::Video { file_id } => Event::Media {
                media: MediaRef::video(file_id),
            },
        }
    }
}

/// Handle to interact with a running chat
#[derive(Clone)]
pub struct ChatHandle {
    pub event_tx: mpsc::Sender<Event>,
    pub session_rx: watch::Receiver<Session>,
}

/// Manager for all chat runtimes
pub struct SessionRegistry<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    store: ExerciseStore,
    transport: Arc<T>,
    charts: Arc<C>,
    rest: RestWindow,
    chats: RwLock<HashMap<ChatId, ChatHandle>>,
}

impl<T, C> SessionRegistry<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    pub fn new(store: ExerciseStore, transport: T, charts: C, rest: RestWindow) -> Self {
        Self {
            store,
            transport: Arc::new(transport),
            charts: Arc::new(charts),
            rest,
            chats: RwLock::new(HashMap::new()),
        }
    }

    #[allow(dead_code)] // Used by tests
    pub fn store(&self) -> &ExerciseStore {
        &self.store
    }

    #[allow(dead_code)] // Used by tests
    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    /// Get the handle of a chat, starting its runtime on first contact
    pub async fn get_or_create(&self, chat: ChatId) -> ChatHandle {
        // Check if already running
        {
            let chats = self.chats.read().await;
            if let Some(handle) = chats.get(&chat) {
                return handle.clone();
            }
        }

        let mut chats = self.chats.write().await;
        // Another task may have created it while we waited for the write lock
        if let Some(handle) = chats.get(&chat) {
            return handle.clone();
        }

        let (event_tx, event_rx) = mpsc::channel(32);
        let (session_tx, session_rx) = watch::channel(Session::default());

        let runtime = ChatRuntime::new(
            chat,
            self.store.clone(),
            Arc::clone(&self.transport),
            Arc::clone(&self.charts),
            self.rest,
            event_rx,
            event_tx.clone(),
            session_tx,
        );
        tokio::spawn(runtime.run());

        let handle = ChatHandle {
            event_tx,
            session_rx,
        };
        chats.insert(chat, handle.clone());
        tracing::debug!(chat_id = %chat, chats = chats.len(), "Registered chat");
        handle
    }

    /// Route an inbound message to its chat
    pub async fn dispatch(&self, message: InboundMessage) -> Result<(), String> {
        let chat = message.chat_id;
        self.send_event(chat, message.into_event()).await
    }

    pub async fn send_event(&self, chat: ChatId, event: Event) -> Result<(), String> {
        let handle = self.get_or_create(chat).await;
        handle
            .event_tx
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {e}"))
    }

    /// Latest published session of a chat, if it has one
    #[allow(dead_code)] // Used by tests
    pub async fn session(&self, chat: ChatId) -> Option<Session> {
        let chats = self.chats.read().await;
        chats.get(&chat).map(|h| h.session_rx.borrow().clone())
    }

    #[allow(dead_code)] // Used by tests
    pub async fn chat_count(&self) -> usize {
        self.chats.read().await.len()
    }
}

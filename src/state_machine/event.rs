//! Events that drive a chat session

use crate::store::MediaRef;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    // User events
    Text { text: String },
    Media { media: MediaRef },

    // Scheduler events
    /// A rest timer scheduled for `run` at `cursor` fired
    RestElapsed { run: u64, cursor: usize },
}

impl Event {
    pub fn text(text: impl Into<String>) -> Self {
        Event::Text { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Event::Text { .. } => "text",
            Event::Media { .. } => "media",
            Event::RestElapsed { .. } => "rest_elapsed",
        }
    }
}

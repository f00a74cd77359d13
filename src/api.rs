//! HTTP surface: liveness probe and the chat platform webhook

mod handlers;

pub use handlers::create_router;

use crate::runtime::{ChartRenderer, SessionRegistry, Transport};
use std::sync::Arc;

/// Application state shared across handlers
pub struct AppState<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    pub registry: Arc<SessionRegistry<T, C>>,
    /// Path secret the webhook must be called with
    pub webhook_token: Arc<str>,
}

impl<T, C> AppState<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    pub fn new(registry: Arc<SessionRegistry<T, C>>, webhook_token: &str) -> Self {
        Self {
            registry,
            webhook_token: Arc::from(webhook_token),
        }
    }
}

// Derived Clone would require T: Clone and C: Clone
impl<T, C> Clone for AppState<T, C>
where
    T: Transport + 'static,
    C: ChartRenderer + 'static,
{
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            webhook_token: Arc::clone(&self.webhook_token),
        }
    }
}

//! Core conversation state machine
//!
//! Pure transitions over a per-chat session. Effects returned by
//! `transition` are carried out by the chat runtime.

mod effect;
pub mod event;
pub mod input;
pub mod keyboard;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use keyboard::Keyboard;
pub use state::{ChatId, Mode, Session};
pub use transition::{transition, TransitionResult};

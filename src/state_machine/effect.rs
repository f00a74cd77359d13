//! Effects produced by state transitions

use super::keyboard::Keyboard;
use crate::store::{Day, ExerciseRecord, MediaRef};
use std::collections::BTreeMap;

/// Effects to be executed by the chat runtime after a transition
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a text message, optionally replacing the reply keyboard
    SendText {
        text: String,
        keyboard: Option<Keyboard>,
    },

    /// Show a stored photo or video
    SendMedia { media: MediaRef },

    /// Send a random quote plus a best-effort sticker
    SendMotivation,

    /// Render and send the weight progress chart
    SendChart { series: BTreeMap<Day, Vec<f64>> },

    /// Append an exercise to the store and confirm (or report the failure)
    AppendExercise { day: Day, record: ExerciseRecord },

    /// Log a set against a stored exercise
    RecordSet {
        day: Day,
        index: usize,
        reps: u32,
        weight: f64,
    },

    /// Rewrite the store document
    PersistStore,

    /// Start a rest timer that fires `Event::RestElapsed { run, cursor }`
    ScheduleRest { run: u64, cursor: usize },
}

impl Effect {
    pub fn text(text: impl Into<String>) -> Self {
        Effect::SendText {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn text_with(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Effect::SendText {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }

    /// Whether this effect writes to the durable store
    pub fn touches_store(&self) -> bool {
        matches!(
            self,
            Effect::AppendExercise { .. } | Effect::RecordSet { .. } | Effect::PersistStore
        )
    }
}

//! Per-chat session state

use crate::store::{Day, ExerciseKind, ExerciseRecord};
use std::collections::BTreeMap;
use std::fmt;

/// Opaque chat identity assigned by the transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a chat currently is in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Main menu
    #[default]
    Main,

    /// Day picker shown, waiting for the training day
    SelectTrainingDay,

    /// Walking the snapshot
    Training {
        day: Day,
        /// Tag of this run; bumped on every training start
        run: u64,
        /// A rest timer is pending
        resting: bool,
    },

    AddSelectDay,
    AddWaitName,
    AddWaitKind,
    AddWaitMedia,

    Stats,
    Motivation,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Main => "main",
            Mode::SelectTrainingDay => "select_training_day",
            Mode::Training { .. } => "training",
            Mode::AddSelectDay => "add_select_day",
            Mode::AddWaitName => "add_wait_name",
            Mode::AddWaitKind => "add_wait_kind",
            Mode::AddWaitMedia => "add_wait_media",
            Mode::Stats => "stats",
            Mode::Motivation => "motivation",
        }
    }

    #[allow(dead_code)] // Used by tests
    pub fn is_training(&self) -> bool {
        matches!(self, Mode::Training { .. })
    }
}

/// Transient fields of the add-exercise dialog and of test mode
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scratch {
    pub pending_day: Option<Day>,
    pub pending_name: Option<String>,
    pub pending_kind: Option<ExerciseKind>,
    /// Test-mode day lists; never written to the store
    pub ephemeral_days: BTreeMap<Day, Vec<ExerciseRecord>>,
}

impl Scratch {
    /// Drop the add-dialog fields, keeping test-mode day lists
    pub fn clear_pending(&mut self) {
        self.pending_day = None;
        self.pending_name = None;
        self.pending_kind = None;
    }
}

/// Everything the bot remembers about one chat
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Session {
    pub mode: Mode,
    /// Copy of the day's exercises taken at training start
    pub snapshot: Vec<ExerciseRecord>,
    /// Index into `snapshot` of the exercise in progress
    pub cursor: usize,
    /// Test mode: mutations skip the store
    pub ephemeral: bool,
    pub scratch: Scratch,
    /// Training runs started so far
    pub runs: u64,
}

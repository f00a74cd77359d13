//! Normalization of free-text user input into labels

use super::keyboard::{
    BTN_ADD, BTN_ADVANCE, BTN_BACK, BTN_CANCEL, BTN_CHART_STATS, BTN_MORE_TIP, BTN_MOTIVATION,
    BTN_NEXT_TIP, BTN_SIMPLE_STATS, BTN_STATS, BTN_TEST_MODE, BTN_TRAINING, DAY_PREFIX,
};
use crate::store::Day;
use regex::Regex;
use std::sync::OnceLock;

/// A recognized button press or command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Start,
    ExitTest,
    StartTraining,
    AddExercise,
    Stats,
    Motivation,
    ToggleTestMode,
    Advance,
    Back,
    Cancel,
    SimpleStats,
    ChartStats,
    NextTip,
    Day(Day),
}

impl Label {
    /// Match a button label, a command, or a typed synonym
    pub fn parse(text: &str) -> Option<Label> {
        let text = text.trim();
        let label = match text {
            BTN_TRAINING => Label::StartTraining,
            BTN_ADD => Label::AddExercise,
            BTN_STATS => Label::Stats,
            BTN_MOTIVATION => Label::Motivation,
            BTN_TEST_MODE => Label::ToggleTestMode,
            BTN_ADVANCE => Label::Advance,
            BTN_BACK => Label::Back,
            BTN_CANCEL => Label::Cancel,
            BTN_SIMPLE_STATS => Label::SimpleStats,
            BTN_CHART_STATS => Label::ChartStats,
            BTN_NEXT_TIP | BTN_MORE_TIP => Label::NextTip,
            _ => return Self::parse_typed(text),
        };
        Some(label)
    }

    fn parse_typed(text: &str) -> Option<Label> {
        let lower = text.to_lowercase();
        let label = match lower.as_str() {
            "/start" => Label::Start,
            "/exit_test" | "/exit test" | "/exittest" => Label::ExitTest,
            "start training" | "training" => Label::StartTraining,
            "add exercise" | "add" => Label::AddExercise,
            "stats" | "statistics" => Label::Stats,
            "motivation" | "tips" => Label::Motivation,
            "test mode" => Label::ToggleTestMode,
            "next" | "advance" | "done" => Label::Advance,
            "back" => Label::Back,
            "cancel" => Label::Cancel,
            "simple" => Label::SimpleStats,
            "chart" | "charts" => Label::ChartStats,
            "next tip" | "more" => Label::NextTip,
            _ => {
                let bare = lower.trim_start_matches(DAY_PREFIX).trim();
                return bare.parse::<Day>().ok().map(Label::Day);
            }
        };
        Some(label)
    }

    pub fn is_exit(self) -> bool {
        matches!(self, Label::Back | Label::Cancel)
    }
}

/// "yes"-like answer to the strength question
pub fn is_affirmative(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "yes" | "y" | "да" | "д" | "+"
    )
}

/// Answer that skips the media step
pub fn is_skip_media(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "none" | "no" | "skip" | "нет" | "-"
    )
}

fn logged_set_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(\d{1,4})\s*[xX×*хХ]\s*(\d{1,4}(?:[.,]\d{1,2})?)\s*(?:kg)?\s*$")
            .expect("logged set regex is valid")
    })
}

/// Parse a logged set written as `<reps> x <weight>`, e.g. `8 x 62.5`
pub fn parse_logged_set(text: &str) -> Option<(u32, f64)> {
    let caps = logged_set_regex().captures(text)?;
    let reps: u32 = caps[1].parse().ok()?;
    let weight: f64 = caps[2].replace(',', ".").parse().ok()?;
    (reps > 0).then_some((reps, weight))
}

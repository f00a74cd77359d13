//! Pure state transition function
//!
//! Given the same session, week and event, `transition` always returns the
//! same result. All I/O, randomness and timing live in the runtime.

use super::input::{is_affirmative, is_skip_media, parse_logged_set, Label};
use super::keyboard::Keyboard;
use super::state::{Mode, Session};
use super::{Effect, Event};
use crate::stats;
use crate::store::{Day, ExerciseKind, ExerciseRecord, MediaRef, WeekPlan};

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Apply one event to a session.
///
/// Never fails: input that has no meaning in the current mode yields a
/// re-prompt and an unchanged session, and stale rest timers yield nothing.
pub fn transition(session: &Session, week: &WeekPlan, event: Event) -> TransitionResult {
    // Escapes accepted from every mode
    if let Event::Text { text } = &event {
        match Label::parse(text) {
            Some(Label::ExitTest) => return exit_test_mode(session),
            Some(Label::Start) => return restart(session),
            _ => {}
        }
    }

    match (session.mode, event) {
        (_, Event::RestElapsed { run, cursor }) => rest_elapsed(session, run, cursor),

        (Mode::Main, Event::Text { text }) => main_menu(session, &text),
        (Mode::SelectTrainingDay, Event::Text { text }) => select_training_day(session, week, &text),
        (Mode::Training { day, run, resting }, Event::Text { text }) => {
            training_input(session, day, run, resting, &text)
        }

        (Mode::AddSelectDay, Event::Text { text }) => add_select_day(session, &text),
        (Mode::AddWaitName, Event::Text { text }) => add_wait_name(session, &text),
        (Mode::AddWaitKind, Event::Text { text }) => add_wait_kind(session, &text),
        (Mode::AddWaitMedia, Event::Text { text }) => add_wait_media_text(session, week, &text),
        (Mode::AddWaitMedia, Event::Media { media }) => finish_add(session, week, Some(media)),

        (Mode::Stats, Event::Text { text }) => stats_menu(session, week, &text),
        (Mode::Motivation, Event::Text { text }) => motivation_menu(session, &text),

        // Media anywhere else has no meaning
        (_, Event::Media { .. }) => not_understood(session),
    }
}

// ============================================================================
// Escapes
// ============================================================================

fn exit_test_mode(session: &Session) -> TransitionResult {
    let mut next = back_to_main(session);
    next.ephemeral = false;
    next.scratch = Default::default();
    TransitionResult::new(next)
        .with_effect(Effect::text_with("Left test mode.", Keyboard::main_menu()))
}

fn restart(session: &Session) -> TransitionResult {
    let mut next = back_to_main(session);
    next.ephemeral = false;
    next.scratch = Default::default();
    TransitionResult::new(next).with_effect(Effect::text_with(
        "Hi! I'm your fitness bot. Choose an action:",
        Keyboard::main_menu(),
    ))
}

/// Session in `Main` with any training run dropped
fn back_to_main(session: &Session) -> Session {
    let mut next = session.clone();
    next.mode = Mode::Main;
    next.snapshot.clear();
    next.cursor = 0;
    next.scratch.clear_pending();
    next
}

fn main_menu_result(session: &Session, text: &str) -> TransitionResult {
    TransitionResult::new(back_to_main(session))
        .with_effect(Effect::text_with(text, Keyboard::main_menu()))
}

// ============================================================================
// Main menu
// ============================================================================

fn main_menu(session: &Session, text: &str) -> TransitionResult {
    let mut next = session.clone();
    match Label::parse(text) {
        Some(Label::StartTraining) => {
            next.mode = Mode::SelectTrainingDay;
            TransitionResult::new(next)
                .with_effect(Effect::text_with("Choose a day:", Keyboard::days(true)))
        }
        Some(Label::AddExercise) => {
            next.mode = Mode::AddSelectDay;
            next.scratch.clear_pending();
            TransitionResult::new(next).with_effect(Effect::text_with(
                "📅 Which day should the exercise go to?",
                Keyboard::days(true),
            ))
        }
        Some(Label::Stats) => {
            next.mode = Mode::Stats;
            TransitionResult::new(next)
                .with_effect(Effect::text_with("Choose the statistics type:", Keyboard::stats()))
        }
        Some(Label::Motivation) => {
            next.mode = Mode::Motivation;
            TransitionResult::new(next).with_effect(Effect::SendMotivation)
        }
        Some(Label::ToggleTestMode) => {
            next.ephemeral = !session.ephemeral;
            let text = if next.ephemeral {
                "🧪 Test mode on. Nothing you add or log is saved. Send /exit_test to leave."
            } else {
                next.scratch.ephemeral_days.clear();
                "🧪 Test mode off."
            };
            TransitionResult::new(next).with_effect(Effect::text_with(text, Keyboard::main_menu()))
        }
        _ => TransitionResult::new(next).with_effect(Effect::text_with(
            "Choose an action from the menu.",
            Keyboard::main_menu(),
        )),
    }
}

// ============================================================================
// Training
// ============================================================================

fn select_training_day(session: &Session, week: &WeekPlan, text: &str) -> TransitionResult {
    let day = match Label::parse(text) {
        Some(Label::Day(day)) => day,
        Some(label) if label.is_exit() => return main_menu_result(session, "Main menu:"),
        _ => {
            return TransitionResult::new(session.clone())
                .with_effect(Effect::text_with("Unknown day.", Keyboard::days(true)))
        }
    };

    let snapshot = day_exercises(session, week, day);
    if snapshot.is_empty() {
        return main_menu_result(
            session,
            "There are no exercises for this day. Add some under \"➕ Add exercise\".",
        );
    }

    let mut next = session.clone();
    next.runs += 1;
    next.mode = Mode::Training {
        day,
        run: next.runs,
        resting: false,
    };
    next.snapshot = snapshot;
    next.cursor = 0;

    let intro = Effect::text(format!(
        "🔥 Starting training: {day}. Exercises: {}",
        next.snapshot.len()
    ));
    let first = show_exercise(&next.snapshot[0]);
    TransitionResult::new(next)
        .with_effect(intro)
        .with_effects(first)
}

/// The list a run on `day` walks: the test-mode copy when there is one,
/// otherwise the stored list
fn day_exercises(session: &Session, week: &WeekPlan, day: Day) -> Vec<ExerciseRecord> {
    if session.ephemeral {
        if let Some(records) = session.scratch.ephemeral_days.get(&day) {
            return records.clone();
        }
    }
    week.day(day).to_vec()
}

fn show_exercise(record: &ExerciseRecord) -> Vec<Effect> {
    let mut effects = Vec::with_capacity(2);
    if let Some(media) = &record.media {
        effects.push(Effect::SendMedia {
            media: media.clone(),
        });
    }

    let mut text = format!("🔸 {} ({})", record.name, record.kind);
    if let (Some(reps), Some(weight)) = (record.sets_history.last(), record.last_weight()) {
        text.push_str(&format!(
            "\nLast time: {reps} x {} kg",
            stats::format_weight(weight)
        ));
    }
    text.push_str("\nLog a set as \"reps x weight\", press ⏭ Next when done.");
    effects.push(Effect::text_with(text, Keyboard::training()));
    effects
}

fn training_input(
    session: &Session,
    day: Day,
    run: u64,
    resting: bool,
    text: &str,
) -> TransitionResult {
    if let Some(Label::Advance) = Label::parse(text) {
        if resting {
            return TransitionResult::new(session.clone()).with_effect(Effect::text(
                "⏳ Still resting. The next exercise will come automatically.",
            ));
        }
        let mut next = session.clone();
        next.mode = Mode::Training {
            day,
            run,
            resting: true,
        };
        return TransitionResult::new(next).with_effect(Effect::ScheduleRest {
            run,
            cursor: session.cursor,
        });
    }

    if let Some((reps, weight)) = parse_logged_set(text) {
        let index = session.cursor;
        if index >= session.snapshot.len() {
            return not_understood(session);
        }

        // Durable sets reach the snapshot and get confirmed only once stored
        if !session.ephemeral {
            return TransitionResult::new(session.clone()).with_effect(Effect::RecordSet {
                day,
                index,
                reps,
                weight,
            });
        }

        let mut next = session.clone();
        let record = &mut next.snapshot[index];
        record.log_set(reps, weight);
        let confirmation = Effect::text(stats::logged_set_message(record.set_count(), reps, weight));
        return TransitionResult::new(next).with_effect(confirmation);
    }

    TransitionResult::new(session.clone()).with_effect(Effect::text_with(
        "Press ⏭ Next when you finish the exercise, or log a set as \"8 x 60\".",
        Keyboard::training(),
    ))
}

fn rest_elapsed(session: &Session, run: u64, cursor: usize) -> TransitionResult {
    let Mode::Training {
        day,
        run: active_run,
        resting: true,
    } = session.mode
    else {
        return TransitionResult::new(session.clone());
    };
    if active_run != run || session.cursor != cursor {
        return TransitionResult::new(session.clone());
    }

    let next_cursor = cursor + 1;
    if next_cursor >= session.snapshot.len() {
        let mut result = main_menu_result(session, "🎉 Training complete! Great job!");
        if !session.ephemeral {
            result = result.with_effect(Effect::PersistStore);
        }
        return result;
    }

    let mut next = session.clone();
    next.cursor = next_cursor;
    next.mode = Mode::Training {
        day,
        run,
        resting: false,
    };
    let record = &next.snapshot[next_cursor];
    let announce = Effect::text(format!(
        "🏋️ Moving on to the next exercise: {}",
        record.name
    ));
    let show = show_exercise(record);
    TransitionResult::new(next)
        .with_effect(announce)
        .with_effects(show)
}

// ============================================================================
// Add-exercise dialog
// ============================================================================

fn cancel_add(session: &Session) -> TransitionResult {
    main_menu_result(session, "Adding cancelled.")
}

fn add_select_day(session: &Session, text: &str) -> TransitionResult {
    match Label::parse(text) {
        Some(Label::Day(day)) => {
            let mut next = session.clone();
            next.scratch.pending_day = Some(day);
            next.mode = Mode::AddWaitName;
            TransitionResult::new(next).with_effect(Effect::text_with(
                format!("Enter the exercise name for {day}:"),
                Keyboard::cancel(),
            ))
        }
        Some(label) if label.is_exit() => cancel_add(session),
        _ => TransitionResult::new(session.clone())
            .with_effect(Effect::text_with("Unknown day.", Keyboard::days(true))),
    }
}

fn add_wait_name(session: &Session, text: &str) -> TransitionResult {
    if Label::parse(text).is_some_and(Label::is_exit) {
        return cancel_add(session);
    }
    let name = text.trim();
    if name.is_empty() {
        return TransitionResult::new(session.clone())
            .with_effect(Effect::text_with("Enter the exercise name:", Keyboard::cancel()));
    }

    let mut next = session.clone();
    next.scratch.pending_name = Some(name.to_string());
    next.mode = Mode::AddWaitKind;
    TransitionResult::new(next).with_effect(Effect::text_with(
        "Is it a strength exercise? (yes/no)",
        Keyboard::cancel(),
    ))
}

fn add_wait_kind(session: &Session, text: &str) -> TransitionResult {
    if Label::parse(text).is_some_and(Label::is_exit) {
        return cancel_add(session);
    }
    let kind = if is_affirmative(text) {
        ExerciseKind::Strength
    } else {
        ExerciseKind::Cardio
    };

    let mut next = session.clone();
    next.scratch.pending_kind = Some(kind);
    next.mode = Mode::AddWaitMedia;
    TransitionResult::new(next).with_effect(Effect::text_with(
        "Send a photo or video, or \"none\" to skip.",
        Keyboard::cancel(),
    ))
}

fn add_wait_media_text(session: &Session, week: &WeekPlan, text: &str) -> TransitionResult {
    if Label::parse(text).is_some_and(Label::is_exit) {
        return cancel_add(session);
    }
    if is_skip_media(text) {
        return finish_add(session, week, None);
    }
    TransitionResult::new(session.clone()).with_effect(Effect::text_with(
        "Didn't recognize that. Send a photo/video or \"none\".",
        Keyboard::cancel(),
    ))
}

fn finish_add(session: &Session, week: &WeekPlan, media: Option<MediaRef>) -> TransitionResult {
    let scratch = &session.scratch;
    let (Some(day), Some(name), Some(kind)) = (
        scratch.pending_day,
        scratch.pending_name.clone(),
        scratch.pending_kind,
    ) else {
        return main_menu_result(session, "Something went wrong, let's start over.");
    };
    let record = ExerciseRecord::new(name, kind, media);

    if session.ephemeral {
        let confirmation = format!("✅ Exercise '{}' added to {day} (test mode).", record.name);
        let mut next = back_to_main(session);
        next.scratch
            .ephemeral_days
            .entry(day)
            .or_insert_with(|| week.day(day).to_vec())
            .push(record);
        return TransitionResult::new(next)
            .with_effect(Effect::text_with(confirmation, Keyboard::main_menu()));
    }

    // The runtime confirms once the store accepts the record
    TransitionResult::new(back_to_main(session)).with_effect(Effect::AppendExercise { day, record })
}

// ============================================================================
// Stats and motivation
// ============================================================================

fn stats_menu(session: &Session, week: &WeekPlan, text: &str) -> TransitionResult {
    match Label::parse(text) {
        Some(Label::SimpleStats) => TransitionResult::new(back_to_main(session)).with_effect(
            Effect::text_with(stats::simple_report(week), Keyboard::main_menu()),
        ),
        Some(Label::ChartStats) => {
            TransitionResult::new(back_to_main(session)).with_effect(Effect::SendChart {
                series: stats::weight_series(week),
            })
        }
        Some(label) if label.is_exit() => main_menu_result(session, "Main menu:"),
        _ => TransitionResult::new(session.clone()).with_effect(Effect::text_with(
            "Choose the statistics type:",
            Keyboard::stats(),
        )),
    }
}

fn motivation_menu(session: &Session, text: &str) -> TransitionResult {
    match Label::parse(text) {
        // A typed "next" parses as Advance
        Some(Label::NextTip | Label::Advance) => {
            TransitionResult::new(session.clone()).with_effect(Effect::SendMotivation)
        }
        Some(label) if label.is_exit() => main_menu_result(session, "Main menu:"),
        _ => TransitionResult::new(session.clone())
            .with_effect(Effect::text_with("Want another tip?", Keyboard::motivation())),
    }
}

// ============================================================================
// Fallback
// ============================================================================

fn not_understood(session: &Session) -> TransitionResult {
    TransitionResult::new(session.clone()).with_effect(Effect::text_with(
        "I didn't understand that.",
        keyboard_for(session.mode),
    ))
}

/// Keyboard matching what a mode expects next
fn keyboard_for(mode: Mode) -> Keyboard {
    match mode {
        Mode::Main => Keyboard::main_menu(),
        Mode::SelectTrainingDay | Mode::AddSelectDay => Keyboard::days(true),
        Mode::Training { .. } => Keyboard::training(),
        Mode::AddWaitName | Mode::AddWaitKind | Mode::AddWaitMedia => Keyboard::cancel(),
        Mode::Stats => Keyboard::stats(),
        Mode::Motivation => Keyboard::motivation(),
    }
}

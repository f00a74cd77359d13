//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across arbitrary input sequences.

use super::keyboard::{
    BTN_ADD, BTN_ADVANCE, BTN_BACK, BTN_CANCEL, BTN_CHART_STATS, BTN_MOTIVATION, BTN_NEXT_TIP,
    BTN_SIMPLE_STATS, BTN_STATS, BTN_TEST_MODE, BTN_TRAINING,
};
use super::*;
use crate::store::{Day, ExerciseKind, ExerciseRecord, MediaRef, WeekPlan};
use proptest::prelude::*;

// ============================================================================
// Test Helpers
// ============================================================================

fn test_week() -> WeekPlan {
    let mut week = WeekPlan::new();
    for name in ["Squat", "Bench", "Row"] {
        week.day_mut(Day::Monday)
            .push(ExerciseRecord::new(name, ExerciseKind::Strength, None));
    }
    week.day_mut(Day::Wednesday).push(ExerciseRecord::new(
        "Bike",
        ExerciseKind::Cardio,
        Some(MediaRef::video("vid")),
    ));
    week
}

/// One step of a simulated chat
#[derive(Debug, Clone)]
enum Step {
    Send(Event),
    /// Deliver the most recently scheduled rest timer
    FireLastRest,
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_text() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            BTN_TRAINING,
            BTN_ADD,
            BTN_STATS,
            BTN_TEST_MODE,
            BTN_MOTIVATION,
            BTN_ADVANCE,
            BTN_BACK,
            BTN_CANCEL,
            BTN_SIMPLE_STATS,
            BTN_CHART_STATS,
            BTN_NEXT_TIP,
            "📅 Monday",
            "📅 Tuesday",
            "📅 Wednesday",
            "Squat",
            "yes",
            "no",
            "none",
            "8 x 60",
            "/exit_test",
            "/start",
        ])
        .prop_map(str::to_string),
        "[a-z ]{1,12}",
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        6 => arb_text().prop_map(Event::text),
        1 => "[a-z]{4}".prop_map(|id| Event::Media { media: MediaRef::photo(id) }),
        1 => (0u64..4, 0usize..4).prop_map(|(run, cursor)| Event::RestElapsed { run, cursor }),
    ]
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        4 => arb_event().prop_map(Step::Send),
        1 => Just(Step::FireLastRest),
    ]
}

// ============================================================================
// Invariant Checkers
// ============================================================================

fn training_is_consistent(session: &Session) -> bool {
    match session.mode {
        Mode::Training { run, .. } => {
            !session.snapshot.is_empty()
                && session.cursor < session.snapshot.len()
                && run == session.runs
        }
        _ => session.snapshot.is_empty() && session.cursor == 0,
    }
}

fn is_live_timer(session: &Session, run: u64, cursor: usize) -> bool {
    matches!(
        session.mode,
        Mode::Training { run: r, resting: true, .. } if r == run && session.cursor == cursor
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Training always points at an exercise of a non-empty snapshot
    #[test]
    fn prop_training_cursor_in_bounds(steps in proptest::collection::vec(arb_step(), 0..40)) {
        let week = test_week();
        let mut session = Session::default();
        let mut last_rest = None;

        for step in steps {
            let event = match step {
                Step::Send(event) => event,
                Step::FireLastRest => match last_rest {
                    Some((run, cursor)) => Event::RestElapsed { run, cursor },
                    None => continue,
                },
            };
            let result = transition(&session, &week, event);
            for effect in &result.effects {
                if let Effect::ScheduleRest { run, cursor } = effect {
                    last_rest = Some((*run, *cursor));
                }
            }
            session = result.new_state;
            prop_assert!(training_is_consistent(&session), "bad session: {:?}", session);
        }
    }

    // A transition never starts a second timer while one is pending
    #[test]
    fn prop_at_most_one_pending_rest(steps in proptest::collection::vec(arb_step(), 0..40)) {
        let week = test_week();
        let mut session = Session::default();
        let mut last_rest = None;

        for step in steps {
            let event = match step {
                Step::Send(event) => event,
                Step::FireLastRest => match last_rest {
                    Some((run, cursor)) => Event::RestElapsed { run, cursor },
                    None => continue,
                },
            };
            let was_resting = matches!(session.mode, Mode::Training { resting: true, .. });
            let result = transition(&session, &week, event);

            let scheduled: Vec<_> = result
                .effects
                .iter()
                .filter_map(|e| match e {
                    Effect::ScheduleRest { run, cursor } => Some((*run, *cursor)),
                    _ => None,
                })
                .collect();
            prop_assert!(scheduled.len() <= 1);
            if let Some(&(run, cursor)) = scheduled.first() {
                prop_assert!(!was_resting, "second timer scheduled while resting");
                prop_assert!(is_live_timer(&result.new_state, run, cursor));
                last_rest = Some((run, cursor));
            }
            session = result.new_state;
        }
    }

    // A rest signal that does not match the live timer changes nothing
    #[test]
    fn prop_stale_rest_is_noop(
        steps in proptest::collection::vec(arb_step(), 0..30),
        run in 0u64..4,
        cursor in 0usize..4,
    ) {
        let week = test_week();
        let mut session = Session::default();
        for step in steps {
            if let Step::Send(event) = step {
                session = transition(&session, &week, event).new_state;
            }
        }

        prop_assume!(!is_live_timer(&session, run, cursor));
        let result = transition(&session, &week, Event::RestElapsed { run, cursor });
        prop_assert_eq!(result.new_state, session);
        prop_assert!(result.effects.is_empty());
    }

    // Test mode never reaches the durable store
    #[test]
    fn prop_ephemeral_never_touches_store(events in proptest::collection::vec(arb_event(), 0..40)) {
        let week = test_week();
        let mut session = Session::default();
        for event in events {
            let result = transition(&session, &week, event);
            if session.ephemeral {
                prop_assert!(
                    !result.effects.iter().any(Effect::touches_store),
                    "store effect in test mode: {:?}",
                    result.effects
                );
            }
            session = result.new_state;
        }
    }

    // Same inputs, same outputs
    #[test]
    fn prop_transition_is_deterministic(
        events in proptest::collection::vec(arb_event(), 0..20),
        last in arb_event(),
    ) {
        let week = test_week();
        let mut session = Session::default();
        for event in events {
            session = transition(&session, &week, event).new_state;
        }

        let a = transition(&session, &week, last.clone());
        let b = transition(&session, &week, last);
        prop_assert_eq!(a.new_state, b.new_state);
        prop_assert_eq!(a.effects, b.effects);
    }

    // /exit_test lands in Main with test mode off from anywhere
    #[test]
    fn prop_exit_test_always_resets(events in proptest::collection::vec(arb_event(), 0..30)) {
        let week = test_week();
        let mut session = Session::default();
        for event in events {
            session = transition(&session, &week, event).new_state;
        }

        let result = transition(&session, &week, Event::text("/exit_test"));
        prop_assert_eq!(result.new_state.mode, Mode::Main);
        prop_assert!(!result.new_state.ephemeral);
        prop_assert!(result.new_state.scratch.ephemeral_days.is_empty());
        prop_assert!(!result.effects.iter().any(Effect::touches_store));
    }
}

//! Read-side statistics over the exercise store

use crate::store::{Day, ExerciseRecord, WeekPlan};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Plain-text listing of every day and its exercises
pub fn simple_report(week: &WeekPlan) -> String {
    let mut out = String::from("📊 Your statistics:");
    for (day, records) in week.iter() {
        let _ = write!(out, "\n\n📅 {day}:");
        if records.is_empty() {
            out.push_str("\n  — No exercises");
            continue;
        }
        for record in records {
            out.push('\n');
            out.push_str(&record_line(record));
        }
    }
    out
}

fn record_line(record: &ExerciseRecord) -> String {
    let mut line = format!("  🔸 {} ({})", record.name, record.kind);
    if record.set_count() > 0 {
        let weights: Vec<String> = record.weight_history.iter().map(|w| format_weight(*w)).collect();
        let _ = write!(
            line,
            "  Sets: {:?}  Weight: [{}]",
            record.sets_history,
            weights.join(", ")
        );
    }
    line
}

/// Weight without a trailing `.0`
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{weight:.0}")
    } else {
        format!("{weight}")
    }
}

pub fn logged_set_message(set: usize, reps: u32, weight: f64) -> String {
    format!("✍️ Logged set {set}: {reps} x {} kg", format_weight(weight))
}

/// Per-day progress series for the chart: the last logged weight of each
/// exercise that has one, in plan order
pub fn weight_series(week: &WeekPlan) -> BTreeMap<Day, Vec<f64>> {
    week.iter()
        .map(|(day, records)| {
            let series = records.iter().filter_map(ExerciseRecord::last_weight).collect();
            (day, series)
        })
        .collect()
}

//! Reply keyboards and the button labels they carry

use crate::store::Day;

pub const BTN_TRAINING: &str = "🏋️ Training mode";
pub const BTN_ADD: &str = "➕ Add exercise";
pub const BTN_STATS: &str = "📊 Statistics";
pub const BTN_TEST_MODE: &str = "🧪 Test mode";
pub const BTN_MOTIVATION: &str = "💡 Tips / Motivation";
pub const BTN_BACK: &str = "↩️ Back";
pub const BTN_CANCEL: &str = "❌ Cancel";
pub const BTN_NEXT_TIP: &str = "💬 Next tip";
pub const BTN_MORE_TIP: &str = "🎁 Another tip";
pub const BTN_SIMPLE_STATS: &str = "📊 Simple stats";
pub const BTN_CHART_STATS: &str = "📈 With charts";
pub const BTN_ADVANCE: &str = "⏭ Next";

/// Prefix on day buttons
pub const DAY_PREFIX: &str = "📅";

/// Rows of button labels, rendered by the transport as a reply keyboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<String>>,
}

impl Keyboard {
    fn from_rows(rows: &[&[&str]]) -> Self {
        Self {
            rows: rows
                .iter()
                .map(|row| row.iter().map(ToString::to_string).collect())
                .collect(),
        }
    }

    pub fn main_menu() -> Self {
        Self::from_rows(&[
            &[BTN_TRAINING, BTN_ADD],
            &[BTN_STATS, BTN_TEST_MODE],
            &[BTN_MOTIVATION],
        ])
    }

    /// Day picker, optionally with a back/cancel row
    pub fn days(with_cancel: bool) -> Self {
        let label = |day: Day| format!("{DAY_PREFIX} {}", day.label());
        let mut rows = vec![
            Day::ALL[..3].iter().map(|d| label(*d)).collect::<Vec<_>>(),
            Day::ALL[3..].iter().map(|d| label(*d)).collect::<Vec<_>>(),
        ];
        if with_cancel {
            rows.push(vec![BTN_BACK.to_string(), BTN_CANCEL.to_string()]);
        }
        Self { rows }
    }

    pub fn cancel() -> Self {
        Self::from_rows(&[&[BTN_BACK, BTN_CANCEL]])
    }

    pub fn motivation() -> Self {
        Self::from_rows(&[&[BTN_NEXT_TIP, BTN_MORE_TIP], &[BTN_BACK]])
    }

    pub fn stats() -> Self {
        Self::from_rows(&[&[BTN_SIMPLE_STATS, BTN_CHART_STATS], &[BTN_BACK]])
    }

    pub fn training() -> Self {
        Self::from_rows(&[&[BTN_ADVANCE]])
    }

    /// Whether any button carries `label`
    #[allow(dead_code)] // Used by tests
    pub fn contains(&self, label: &str) -> bool {
        self.rows.iter().flatten().any(|b| b == label)
    }
}

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

/// Days from the anchor Monday to the first day of the window (Friday).
const WINDOW_START_OFFSET: u64 = 4;
/// Days from the anchor Monday to the last day of the window (next Monday).
const WINDOW_END_OFFSET: u64 = 7;

/// Inclusive date range of a gameweek's fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl PeriodWindow {
    /// Friday-to-Monday window of the week containing `date`.
    ///
    /// The week is anchored on the Monday on or before `date`, so a Sunday
    /// maps back to the Friday two days earlier. `None` when the window
    /// would fall outside the calendar chrono can represent.
    pub fn for_date(date: NaiveDate) -> Option<Self> {
        let monday =
            date.checked_sub_days(Days::new(u64::from(date.weekday().num_days_from_monday())))?;
        Some(Self {
            from: monday.checked_add_days(Days::new(WINDOW_START_OFFSET))?,
            to: monday.checked_add_days(Days::new(WINDOW_END_OFFSET))?,
        })
    }
}

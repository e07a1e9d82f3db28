//! Aura date generation.
//!
//! An aura sequence is the list of days on which a task resurfaces between
//! its start and end date. Gaps start at one day and widen as the sequence
//! progresses, bounded by a cap that depends on the window length:
//!
//! - window <= 10 days: gap grows by 1, capped at 3
//! - window <= 30 days: gap grows by 1, capped at window / 5
//! - longer windows:    gap grows by 2, capped at window / 4
//!
//! The sequence always opens on the start date and closes on the end date.

use chrono::{Days, NaiveDate};
use crate::time::days_between;

const SHORT_WINDOW_DAYS: i64 = 10;
const MEDIUM_WINDOW_DAYS: i64 = 30;
const SHORT_GAP_CAP: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapTier {
    Short,
    Medium,
    Long,
}

impl GapTier {
    pub fn for_span(total_days: i64) -> Self {
        match total_days {
            d if d <= SHORT_WINDOW_DAYS => GapTier::Short,
            d if d <= MEDIUM_WINDOW_DAYS => GapTier::Medium,
            _ => GapTier::Long,
        }
    }

    /// Largest gap (in days) this tier allows for a window of `total_days`.
    pub fn cap(self, total_days: i64) -> i64 {
        match self {
            GapTier::Short => SHORT_GAP_CAP,
            GapTier::Medium => total_days / 5,
            GapTier::Long => total_days / 4,
        }
    }

    fn step(self) -> i64 {
        match self {
            GapTier::Short | GapTier::Medium => 1,
            GapTier::Long => 2,
        }
    }

    pub fn next_gap(self, gap: i64, total_days: i64) -> i64 {
        (gap + self.step()).min(self.cap(total_days))
    }
}

/// Generate the aura sequence for `[start, end]`.
///
/// Deterministic, strictly increasing, duplicate free. A non-positive window
/// yields `[start]`.
pub fn generate_aura_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let total_days = days_between(start, end);
    if total_days <= 0 {
        return vec![start];
    }

    let tier = GapTier::for_span(total_days);
    let mut dates = vec![start];
    let mut cursor = start;
    let mut gap: i64 = 1;

    while cursor < end {
        // Past the calendar's range counts as overshooting the end.
        let candidate = cursor.checked_add_days(Days::new(gap as u64));

        match candidate {
            Some(next) if next < end => {
                dates.push(next);
                cursor = next;
                gap = tier.next_gap(gap, total_days);
            }
            _ => {
                if dates.last() != Some(&end) {
                    dates.push(end);
                }
                break;
            }
        }
    }

    if dates.len() < 2 {
        if let Some(next) = start.succ_opt().filter(|n| *n <= end) {
            dates.push(next);
        }
    }

    dates
}

/// Position of `date` within `dates`.
pub fn position_of(dates: &[NaiveDate], date: NaiveDate) -> Option<usize> {
    dates.iter().position(|d| *d == date)
}

/// First date in `dates` strictly after `date`.
pub fn first_after(dates: &[NaiveDate], date: NaiveDate) -> Option<NaiveDate> {
    dates.iter().copied().find(|d| *d > date)
}

//! Due-state evaluation: initial due date, "due on" membership and the
//! defer transition.
//!
//! Nothing here trusts `current_aura_index`; positions are always recomputed
//! from `created_at` / `end_date` and `current_date`.

use std::borrow::Borrow;

use chrono::{DateTime, NaiveDate, Utc};

use crate::aura::{first_after, generate_aura_dates, position_of};
use crate::error::AuraError;
use crate::task::Task;

/// How a freshly created task picks its first due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitialDateStrategy {
    /// Always the second aura date.
    SecondAuraDate,
    /// First aura date strictly after the start, else the second one.
    FirstAuraDateAfterStart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitialDue {
    pub date: NaiveDate,
    pub index: usize,
    pub aura_dates: Vec<NaiveDate>,
}

pub fn initial_due_date(
    start: NaiveDate,
    end: NaiveDate,
    strategy: InitialDateStrategy,
) -> Result<InitialDue, AuraError> {
    let aura_dates = generate_aura_dates(start, end);
    if aura_dates.len() < 2 {
        return Err(AuraError::InsufficientAuraDates {
            start,
            end,
            count: aura_dates.len(),
        });
    }

    let date = match strategy {
        InitialDateStrategy::SecondAuraDate => aura_dates[1],
        InitialDateStrategy::FirstAuraDateAfterStart => {
            first_after(&aura_dates, start).unwrap_or(aura_dates[1])
        }
    };

    Ok(InitialDue {
        date,
        index: 1,
        aura_dates,
    })
}

/// The task's full aura sequence, recomputed.
pub fn aura_dates_for(task: &Task) -> Vec<NaiveDate> {
    generate_aura_dates(task.created_at, task.end_date)
}

/// Recomputed index of `current_date`, `None` on drift.
pub fn aura_position(task: &Task) -> Option<usize> {
    position_of(&aura_dates_for(task), task.current_date)
}

/// A task is due on `date` when `date` is one of its aura dates and is also
/// its current due date.
pub fn is_due_on(task: &Task, date: NaiveDate) -> bool {
    task.current_date == date && aura_dates_for(task).contains(&date)
}

/// Where a deferred task would move next, with its index in the sequence.
///
/// Falls back to the first aura date after `current_date` when the current
/// date is not part of the sequence. Never returns a date past `end_date`.
pub fn next_aura_date(task: &Task) -> Option<(usize, NaiveDate)> {
    let dates = aura_dates_for(task);

    let next_index = match position_of(&dates, task.current_date) {
        Some(i) => i + 1,
        None => dates.iter().position(|d| *d > task.current_date)?,
    };

    dates
        .get(next_index)
        .copied()
        .filter(|d| *d <= task.end_date)
        .map(|d| (next_index, d))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Moved {
        from: NaiveDate,
        to: NaiveDate,
        index: usize,
        /// `current_date` was not in the sequence and the fallback was used.
        drifted: bool,
    },
    /// No aura date left; the task stays put until it is completed.
    Exhausted,
}

impl Advance {
    pub fn moved(&self) -> bool {
        matches!(self, Advance::Moved { .. })
    }
}

/// Defer `task` to its next aura date.
pub fn advance(task: &mut Task, now: DateTime<Utc>) -> Advance {
    let drifted = aura_position(task).is_none();
    let Some((index, to)) = next_aura_date(task) else {
        return Advance::Exhausted;
    };

    let from = task.current_date;
    task.current_date = to;
    task.current_aura_index = index;
    task.last_updated = Some(now);

    Advance::Moved {
        from,
        to,
        index,
        drifted,
    }
}

/// Split a snapshot into tasks due on `date` and the rest. Order is kept.
///
/// Works on owned tasks as well as references.
pub fn partition_due<T, I>(tasks: I, date: NaiveDate) -> (Vec<T>, Vec<T>)
where
    T: Borrow<Task>,
    I: IntoIterator<Item = T>,
{
    tasks
        .into_iter()
        .partition(|t| is_due_on(<T as Borrow<Task>>::borrow(t), date))
}

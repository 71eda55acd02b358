// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;

use crate::config::Config;
use crate::value::{ByPart, CalendarTime, RecurrenceRule, WeekDayNum};

/// Plain-data snapshot of a [`RecurIterator`](crate::RecurIterator)
///
/// Restoring a snapshot with [`RecurIterator::from_state`](crate::RecurIterator::from_state)
/// yields an iterator that continues exactly where the original stopped, including across a
/// serialization round trip.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IteratorState {
    /// The rule being iterated
    pub rule: RecurrenceRule,

    /// Start of the recurrence
    pub dtstart: CalendarTime,

    /// Most recent candidate
    pub last: CalendarTime,

    /// Working values of each numeric BY part, including defaults seeded from the start
    pub by_data: BTreeMap<ByPart, Vec<i32>>,

    /// Working BYDAY values, sorted by position from the week start
    pub by_day: Vec<WeekDayNum>,

    /// Cursor into the working values of each part
    #[serde(default)]
    pub by_cursor: BTreeMap<ByPart, usize>,

    /// Expanded days of the current year, for YEARLY rules
    #[serde(default)]
    pub days: Vec<i32>,

    /// Cursor into `days`
    #[serde(default)]
    pub days_index: usize,

    /// Occurrences produced so far
    pub occurrence_number: u32,

    /// Whether iteration has finished
    pub completed: bool,

    /// Whether the rule was found to have no occurrences
    #[serde(default)]
    pub unsatisfiable: bool,

    /// Search limits in effect
    #[serde(default)]
    pub config: Config,
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Value types: calendar times, durations, periods, weekdays and recurrence rules.

pub mod calendar;
mod datetime;
mod duration;
mod period;
mod rrule;
mod weekday;

pub use datetime::{CalendarTime, TimeData, TimeField};
pub use duration::Duration;
pub use period::Period;
pub use rrule::{ByPart, Frequency, RecurrenceRule, RecurrenceRuleBuilder, RulePart};
pub use weekday::{WeekDay, WeekDayNum};

pub(crate) use datetime::Parts;

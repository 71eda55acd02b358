// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Shared timezone definitions and collection helpers.

use aimcal_recur::{
    CalendarTime, Frequency, Observance, RecurError, RecurrenceRule, Timezone,
    TimezoneDefinition, UtcOffset, WeekDay, WeekDayNum,
};

/// US Eastern time with the rules in force since 2007.
#[must_use]
pub fn new_york_definition() -> TimezoneDefinition {
    let onset = |month: u8, nth: i8| {
        RecurrenceRule::builder(Frequency::Yearly)
            .by_month([month])
            .by_day([WeekDayNum::nth(nth, WeekDay::Sunday)])
            .build()
            .unwrap()
    };
    TimezoneDefinition::new("America/New_York")
        .with_standard(
            Observance::new(
                CalendarTime::datetime(2007, 11, 4, 2, 0, 0),
                UtcOffset::hm(-4, 0),
                UtcOffset::hm(-5, 0),
            )
            .with_rrule(onset(11, 1))
            .with_name("EST"),
        )
        .with_daylight(
            Observance::new(
                CalendarTime::datetime(2007, 3, 11, 2, 0, 0),
                UtcOffset::hm(-5, 0),
                UtcOffset::hm(-4, 0),
            )
            .with_rrule(onset(3, 2))
            .with_name("EDT"),
        )
}

/// Transition table for [`new_york_definition`].
#[must_use]
pub fn new_york() -> Timezone {
    Timezone::new(new_york_definition())
}

/// Render at most `limit` occurrences in RFC 5545 basic format.
pub fn collect<I>(iter: I, limit: usize) -> Vec<String>
where
    I: Iterator<Item = Result<CalendarTime, RecurError>>,
{
    iter.take(limit).map(|t| t.unwrap().to_string()).collect()
}

/// Render every occurrence of a finite recurrence.
pub fn collect_all<I>(iter: I) -> Vec<String>
where
    I: Iterator<Item = Result<CalendarTime, RecurError>>,
{
    iter.map(|t| t.unwrap().to_string()).collect()
}

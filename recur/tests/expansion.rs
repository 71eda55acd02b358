// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for merged recurrence expansion.

mod common;

use aimcal_recur::{
    CalendarTime, ExpansionState, Frequency, RecurrenceExpansion, RecurrenceRule, RecurrenceSet,
    WeekDay, WeekDayNum,
};

use common::{collect, collect_all};

fn weekly_on_sunday() -> RecurrenceRule {
    RecurrenceRule::builder(Frequency::Weekly)
        .by_day([WeekDayNum::every(WeekDay::Sunday)])
        .count(4)
        .build()
        .unwrap()
}

#[test]
fn expansion_excludes_whole_day_for_date_only_exdate() {
    let start = CalendarTime::datetime(2024, 3, 3, 9, 0, 0);
    let set = RecurrenceSet::new(start)
        .with_rrule(weekly_on_sunday())
        .with_exdate(CalendarTime::date(2024, 3, 10));
    assert_eq!(
        collect_all(set.iter()),
        vec!["20240303T090000", "20240317T090000", "20240324T090000"]
    );
}

#[test]
fn expansion_merges_rdates_in_order() {
    let start = CalendarTime::datetime(2024, 3, 3, 9, 0, 0);
    let set = RecurrenceSet::new(start)
        .with_rrule(weekly_on_sunday())
        .with_rdate(CalendarTime::datetime(2024, 3, 12, 18, 0, 0))
        .with_rdate(CalendarTime::datetime(2024, 3, 10, 9, 0, 0));
    assert_eq!(
        collect_all(set.iter()),
        vec![
            "20240303T090000",
            "20240310T090000",
            "20240312T180000",
            "20240317T090000",
            "20240324T090000",
        ]
    );
}

#[test]
fn expansion_keeps_every_occurrence_of_unsorted_by_lists() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .by_hour([17, 9])
        .by_minute([30, 0])
        .count(4)
        .build()
        .unwrap();
    let set = RecurrenceSet::new(CalendarTime::datetime(2024, 1, 1, 0, 0, 0)).with_rrule(rule);
    assert_eq!(
        collect_all(set.iter()),
        vec!["20240101T090000", "20240101T093000", "20240101T170000", "20240101T173000"]
    );
}

#[test]
fn expansion_never_decreases() {
    let start = CalendarTime::date(2024, 1, 1);
    let monthly = RecurrenceRule::builder(Frequency::Monthly)
        .by_month_day([1, 15, -1])
        .count(12)
        .build()
        .unwrap();
    let set = RecurrenceSet::new(start)
        .with_rrule(monthly)
        .with_rrule(weekly_on_sunday())
        .with_rdate(CalendarTime::date(2024, 1, 15))
        .with_exdate(CalendarTime::date(2024, 2, 1));
    let occurrences: Vec<CalendarTime> = set.iter().map(Result::unwrap).collect();
    assert!(occurrences.windows(2).all(|w| w[0] < w[1]));
    assert!(!occurrences.contains(&CalendarTime::date(2024, 2, 1)));
}

#[test]
fn expansion_resumes_from_serialized_state() {
    let start = CalendarTime::datetime(2024, 3, 3, 9, 0, 0);
    let set = RecurrenceSet::new(start)
        .with_rrule(weekly_on_sunday())
        .with_rdate(CalendarTime::datetime(2024, 3, 12, 18, 0, 0))
        .with_exdate(CalendarTime::datetime(2024, 3, 17, 9, 0, 0));
    let mut expansion = set.iter();
    assert_eq!(
        collect(expansion.by_ref(), 2),
        vec!["20240303T090000", "20240310T090000"]
    );

    let json = serde_json::to_string(&expansion.state()).unwrap();
    let state: ExpansionState = serde_json::from_str(&json).unwrap();
    let resumed = RecurrenceExpansion::from_state(state);
    assert_eq!(
        collect_all(resumed),
        vec!["20240312T180000", "20240324T090000"]
    );
}

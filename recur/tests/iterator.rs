// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Integration tests for single-rule iteration.

mod common;

use aimcal_recur::{
    CalendarTime, Config, Frequency, IteratorState, RecurIterator, RecurrenceRule, WeekDay,
    WeekDayNum,
};

use common::{collect, collect_all};

#[test]
fn iterator_stops_after_count() {
    let rule = RecurrenceRule::builder(Frequency::Daily).count(5).build().unwrap();
    let start = CalendarTime::date(2024, 1, 1);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["20240101", "20240102", "20240103", "20240104", "20240105"]
    );
}

#[test]
fn iterator_includes_until() {
    let rule = RecurrenceRule::builder(Frequency::Daily)
        .until(CalendarTime::date(2024, 1, 3))
        .build()
        .unwrap();
    let start = CalendarTime::date(2024, 1, 1);
    let mut iter = rule.iterator(&start);
    assert_eq!(
        collect(iter.by_ref(), 10),
        vec!["20240101", "20240102", "20240103"]
    );
    assert!(iter.is_completed());
    assert!(!iter.is_unsatisfiable());
    assert!(iter.next().is_none());
}

#[test]
fn iterator_includes_whole_day_of_date_only_until() {
    let rule = RecurrenceRule::builder(Frequency::Hourly)
        .interval(6)
        .until(CalendarTime::date(2024, 1, 1))
        .build()
        .unwrap();
    let start = CalendarTime::datetime(2024, 1, 1, 5, 0, 0);
    assert_eq!(
        collect_all(rule.iterator(&start)),
        vec!["20240101T050000", "20240101T110000", "20240101T170000", "20240101T230000"]
    );
}

#[test]
fn iterator_repeats_weekday_of_start_for_weekly_rules() {
    let rule = RecurrenceRule::builder(Frequency::Weekly).build().unwrap();
    let start = CalendarTime::date(2024, 1, 3);
    for occurrence in rule.iterator(&start).take(60) {
        assert_eq!(occurrence.unwrap().weekday(), WeekDay::Wednesday);
    }
}

#[test]
fn iterator_expands_weekdays_every_other_week() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .interval(2)
        .by_day([WeekDay::Monday, WeekDay::Wednesday, WeekDay::Friday].map(WeekDayNum::every))
        .until(CalendarTime::datetime(1997, 12, 24, 0, 0, 0))
        .build()
        .unwrap();
    let start = CalendarTime::datetime(1997, 9, 1, 9, 0, 0);
    let occurrences = collect_all(rule.iterator(&start));
    assert_eq!(occurrences.len(), 25);
    assert_eq!(
        occurrences[..8],
        [
            "19970901T090000",
            "19970903T090000",
            "19970905T090000",
            "19970915T090000",
            "19970917T090000",
            "19970919T090000",
            "19970929T090000",
            "19971001T090000",
        ]
    );
    assert_eq!(occurrences.last().unwrap(), "19971222T090000");
}

#[test]
fn iterator_moves_weekly_start_to_first_weekday_of_week() {
    let rule = RecurrenceRule::builder(Frequency::Weekly)
        .by_day([WeekDay::Tuesday, WeekDay::Thursday].map(WeekDayNum::every))
        .count(4)
        .build()
        .unwrap();
    // Wednesday: Tuesday of the same week is skipped as it precedes the start
    let start = CalendarTime::date(2024, 1, 3);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["20240104", "20240109", "20240111", "20240116"]
    );
}

#[test]
fn iterator_finds_last_friday_of_month() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_day([WeekDayNum::nth(-1, WeekDay::Friday)])
        .count(3)
        .build()
        .unwrap();
    for day in [1, 10, 26] {
        let start = CalendarTime::date(2024, 1, day);
        assert_eq!(
            collect(rule.iterator(&start), 10),
            vec!["20240126", "20240223", "20240329"],
            "Should start at the last Friday of January from day {day}"
        );
    }
}

#[test]
fn iterator_skips_to_next_month_after_last_candidate() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_day([WeekDayNum::nth(-1, WeekDay::Friday)])
        .count(1)
        .build()
        .unwrap();
    let start = CalendarTime::date(2024, 1, 27);
    assert_eq!(collect(rule.iterator(&start), 10), vec!["20240223"]);
}

#[test]
fn iterator_expands_month_days() {
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_month_day([2, 15])
        .count(5)
        .build()
        .unwrap();
    let start = CalendarTime::datetime(1997, 9, 2, 9, 0, 0);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec![
            "19970902T090000",
            "19970915T090000",
            "19971002T090000",
            "19971015T090000",
            "19971102T090000",
        ]
    );
}

#[test]
fn iterator_selects_set_position_within_month() {
    // Last work day of the month
    let rule = RecurrenceRule::builder(Frequency::Monthly)
        .by_day(
            [
                WeekDay::Monday,
                WeekDay::Tuesday,
                WeekDay::Wednesday,
                WeekDay::Thursday,
                WeekDay::Friday,
            ]
            .map(WeekDayNum::every),
        )
        .by_set_pos([-1])
        .count(3)
        .build()
        .unwrap();
    let start = CalendarTime::date(2024, 1, 1);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["20240131", "20240229", "20240329"]
    );
}

#[test]
fn iterator_skips_months_without_start_day() {
    let rule = RecurrenceRule::builder(Frequency::Monthly).count(4).build().unwrap();
    let start = CalendarTime::date(2024, 1, 31);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["20240131", "20240331", "20240531", "20240731"]
    );
}

#[test]
fn iterator_skips_years_without_leap_day() {
    let rule = RecurrenceRule::builder(Frequency::Yearly).count(3).build().unwrap();
    let start = CalendarTime::date(2024, 2, 29);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["20240229", "20280229", "20320229"]
    );
}

#[test]
fn iterator_expands_every_day_of_january() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .by_month([1])
        .by_day(
            [
                WeekDay::Sunday,
                WeekDay::Monday,
                WeekDay::Tuesday,
                WeekDay::Wednesday,
                WeekDay::Thursday,
                WeekDay::Friday,
                WeekDay::Saturday,
            ]
            .map(WeekDayNum::every),
        )
        .until(CalendarTime::datetime(2000, 1, 31, 14, 0, 0).utc())
        .build()
        .unwrap();
    let start = CalendarTime::datetime(1998, 1, 1, 9, 0, 0);
    let occurrences = collect_all(rule.iterator(&start));
    assert_eq!(occurrences.len(), 93);
    assert_eq!(occurrences[31], "19990101T090000");
}

#[test]
fn iterator_expands_nth_weekday_of_year() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .by_day([WeekDayNum::nth(20, WeekDay::Monday)])
        .count(3)
        .build()
        .unwrap();
    let start = CalendarTime::datetime(1997, 5, 19, 9, 0, 0);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["19970519T090000", "19980518T090000", "19990517T090000"]
    );
}

#[test]
fn iterator_honours_yearly_interval() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .interval(2)
        .by_month([1, 2, 3])
        .count(6)
        .build()
        .unwrap();
    let start = CalendarTime::date(1997, 3, 10);
    assert_eq!(
        collect(rule.iterator(&start), 10),
        vec!["19970310", "19990110", "19990210", "19990310", "20010110", "20010210"]
    );
}

#[test]
fn iterator_reports_unsatisfiable_rule() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .by_month([2])
        .by_month_day([30])
        .build()
        .unwrap();
    let start = CalendarTime::date(2024, 1, 1);
    let config = Config {
        yearly_search_years: 50,
        ..Config::default()
    };
    let mut iter = RecurIterator::with_config(rule, start, config);
    assert!(iter.is_unsatisfiable());
    assert!(iter.is_completed());
    assert_eq!(iter.next_occurrence().unwrap(), None);
}

#[test]
fn iterator_resumes_from_serialized_state() {
    let rule = RecurrenceRule::builder(Frequency::Yearly)
        .by_month([3])
        .by_day([WeekDayNum::nth(2, WeekDay::Sunday)])
        .count(8)
        .build()
        .unwrap();
    let start = CalendarTime::datetime(2020, 3, 8, 2, 0, 0);
    let mut iter = rule.iterator(&start);
    let head = collect(iter.by_ref(), 3);
    assert_eq!(head, vec!["20200308T020000", "20210314T020000", "20220313T020000"]);

    let json = serde_json::to_string(&iter.state()).unwrap();
    let state: IteratorState = serde_json::from_str(&json).unwrap();
    assert_eq!(state.occurrence_number, 3);
    let resumed = RecurIterator::from_state(state);

    let expected = collect_all(iter);
    assert_eq!(expected.len(), 5);
    assert_eq!(collect_all(resumed), expected);
}

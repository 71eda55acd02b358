// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expansion of a YEARLY rule into the days of one year.
//!
//! The BY parts present in a rule select one strategy from [`STRATEGIES`]. Combinations
//! without an entry produce no days.

use std::collections::BTreeSet;

use crate::iterator::{matches_by_day, normalize_month_days, select_set_positions};
use crate::value::calendar::{
    day_of_year, days_in_month, days_in_year, from_day_of_year, week_number, weekday,
};
use crate::value::{ByPart, Parts, RecurrenceRule, WeekDayNum};

/// Set of the day-level BY parts present in a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PartSet(u8);

impl PartSet {
    const DAY: u8 = 1;
    const WEEK_NO: u8 = 1 << 1;
    const MONTH_DAY: u8 = 1 << 2;
    const MONTH: u8 = 1 << 3;
    const YEAR_DAY: u8 = 1 << 4;

    fn of(rule: &RecurrenceRule) -> Self {
        [
            (ByPart::ByDay, Self::DAY),
            (ByPart::ByWeekNo, Self::WEEK_NO),
            (ByPart::ByMonthDay, Self::MONTH_DAY),
            (ByPart::ByMonth, Self::MONTH),
            (ByPart::ByYearDay, Self::YEAR_DAY),
        ]
        .into_iter()
        .filter(|&(part, _)| rule.has(part))
        .fold(Self::default(), |set, (_, bit)| Self(set.0 | bit))
    }

    const fn contains(self, bit: u8) -> bool {
        self.0 & bit != 0
    }

    const fn without(self, bit: u8) -> Self {
        Self(self.0 & !bit)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayExpansion {
    /// The start's month and day
    StartDay,
    /// The start's day in each BYMONTH
    Month,
    /// Each BYMONTHDAY in the start's month
    MonthDay,
    /// Each BYMONTHDAY in each BYMONTH
    MonthAndMonthDay,
    /// BYDAY counted within the year
    WeekDay,
    /// BYDAY counted within each BYMONTH, then BYSETPOS per month
    WeekDayInMonth,
    /// BYDAY within the year, limited to BYMONTHDAY
    WeekDayAndMonthDay,
    /// BYDAY within the year, limited to BYMONTH and BYMONTHDAY
    WeekDayInMonthAndMonthDay,
    /// BYDAY within the year, limited to BYWEEKNO
    WeekDayInWeek,
    /// BYYEARDAY as listed
    YearDay,
    /// BYYEARDAY limited to BYDAY
    YearDayAndWeekDay,
}

#[rustfmt::skip]
const STRATEGIES: [(PartSet, DayExpansion); 11] = {
    use PartSet as P;
    use DayExpansion as E;
    [
        (P(0),                                E::StartDay),
        (P(P::MONTH),                         E::Month),
        (P(P::MONTH_DAY),                     E::MonthDay),
        (P(P::MONTH | P::MONTH_DAY),          E::MonthAndMonthDay),
        (P(P::DAY),                           E::WeekDay),
        (P(P::DAY | P::MONTH),                E::WeekDayInMonth),
        (P(P::DAY | P::MONTH_DAY),            E::WeekDayAndMonthDay),
        (P(P::DAY | P::MONTH | P::MONTH_DAY), E::WeekDayInMonthAndMonthDay),
        (P(P::DAY | P::WEEK_NO),              E::WeekDayInWeek),
        (P(P::YEAR_DAY),                      E::YearDay),
        (P(P::YEAR_DAY | P::DAY),             E::YearDayAndWeekDay),
    ]
};

impl DayExpansion {
    fn select(parts: PartSet) -> Option<Self> {
        STRATEGIES
            .iter()
            .find(|(set, _)| *set == parts)
            .map(|&(_, strategy)| strategy)
    }
}

struct Year<'a> {
    rule: &'a RecurrenceRule,
    by_day: &'a [WeekDayNum],
    start: &'a Parts,
    year: i32,
}

/// Days of `year`, as ascending 1-based day-of-year numbers, on which a YEARLY rule occurs.
pub(super) fn expand_year_days(
    rule: &RecurrenceRule,
    by_day: &[WeekDayNum],
    start: &Parts,
    year: i32,
) -> Vec<i32> {
    let mut parts = PartSet::of(rule);
    if parts.contains(PartSet::MONTH) && parts.contains(PartSet::WEEK_NO) {
        // Only one of the two can drive the expansion
        parts = if week_numbers_within_months(rule, year) {
            parts.without(PartSet::MONTH)
        } else {
            parts.without(PartSet::WEEK_NO)
        };
    }

    let Some(strategy) = DayExpansion::select(parts) else {
        tracing::debug!(%rule, "unsupported combination of yearly parts");
        return Vec::new();
    };

    let ctx = Year {
        rule,
        by_day,
        start,
        year,
    };
    let diy = days_in_year(year);
    let mut days: Vec<i32> = ctx
        .expand(strategy)
        .into_iter()
        .map(|d| if d < 0 { d + diy + 1 } else { d })
        .filter(|d| (1..=diy).contains(d))
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Whether every BYWEEKNO value is below 52 and falls within the weeks spanned by the BYMONTH
/// months.
fn week_numbers_within_months(rule: &RecurrenceRule, year: i32) -> bool {
    let wkst = rule.week_start();
    let mut weeks = BTreeSet::new();
    for month in rule.values(ByPart::ByMonth) {
        let first = week_number(year, month, 1, wkst);
        let last = week_number(year, month, days_in_month(month, year), wkst);
        if first <= last {
            weeks.extend(first..=last);
        } else {
            weeks.extend(first..=53);
            weeks.extend(1..=last);
        }
    }
    rule.values(ByPart::ByWeekNo)
        .iter()
        .all(|w| *w < 52 && weeks.contains(w))
}

impl Year<'_> {
    fn expand(&self, strategy: DayExpansion) -> Vec<i32> {
        let rule = self.rule;
        let year = self.year;
        match strategy {
            DayExpansion::StartDay => self.on_start_day(self.start.month),
            DayExpansion::Month => rule
                .values(ByPart::ByMonth)
                .into_iter()
                .flat_map(|m| self.on_start_day(m))
                .collect(),
            DayExpansion::MonthDay => self.month_days(self.start.month),
            DayExpansion::MonthAndMonthDay => rule
                .values(ByPart::ByMonth)
                .into_iter()
                .flat_map(|m| self.month_days(m))
                .collect(),
            DayExpansion::WeekDay => self.weekdays(),
            DayExpansion::WeekDayInMonth => rule
                .values(ByPart::ByMonth)
                .into_iter()
                .flat_map(|m| self.weekdays_in_month(m))
                .collect(),
            DayExpansion::WeekDayAndMonthDay => self.weekdays_where(|_, month, day| {
                self.month_days(month).contains(&day_of_year(year, month, day))
            }),
            DayExpansion::WeekDayInMonthAndMonthDay => {
                let months = rule.values(ByPart::ByMonth);
                self.weekdays_where(|_, month, day| {
                    months.contains(&month)
                        && self.month_days(month).contains(&day_of_year(year, month, day))
                })
            }
            DayExpansion::WeekDayInWeek => {
                let wkst = rule.week_start();
                let weeks_in_year = week_number(year, 12, 28, wkst);
                let weeks: Vec<i32> = rule
                    .values(ByPart::ByWeekNo)
                    .into_iter()
                    .map(|w| if w < 0 { w + weeks_in_year + 1 } else { w })
                    .collect();
                self.weekdays_where(|y, month, day| {
                    weeks.contains(&week_number(y, month, day, wkst))
                })
            }
            DayExpansion::YearDay => rule.values(ByPart::ByYearDay),
            DayExpansion::YearDayAndWeekDay => {
                let diy = days_in_year(year);
                let weekdays: BTreeSet<i32> = self.weekdays().into_iter().collect();
                rule.values(ByPart::ByYearDay)
                    .into_iter()
                    .map(|d| if d < 0 { d + diy + 1 } else { d })
                    .filter(|d| weekdays.contains(d))
                    .collect()
            }
        }
    }

    /// The start's day of month in `month`, skipped when the month is too short.
    fn on_start_day(&self, month: i32) -> Vec<i32> {
        let day = self.start.day;
        if day <= days_in_month(month, self.year) {
            vec![day_of_year(self.year, month, day)]
        } else {
            Vec::new()
        }
    }

    fn month_days(&self, month: i32) -> Vec<i32> {
        let dim = days_in_month(month, self.year);
        normalize_month_days(&self.rule.values(ByPart::ByMonthDay), dim)
            .into_iter()
            .map(|d| day_of_year(self.year, month, d))
            .collect()
    }

    /// Every day matching BYDAY, ordinals counted from the start or end of the year.
    fn weekdays(&self) -> Vec<i32> {
        let first = weekday(self.year, 1, 1);
        let last = weekday(self.year, 12, 31);
        let end = days_in_year(self.year);

        let mut days = Vec::new();
        for d in self.by_day {
            let target = i32::from(d.day.number());
            match d.position() {
                0 => {
                    let from = (target - i32::from(first.number())).rem_euclid(7) + 1;
                    days.extend((from..=end).step_by(7));
                }
                pos if pos > 0 => {
                    let from = (target - i32::from(first.number())).rem_euclid(7) + 1;
                    days.push(from + (pos - 1) * 7);
                }
                pos => {
                    let to = end - (i32::from(last.number()) - target).rem_euclid(7);
                    days.push(to + (pos + 1) * 7);
                }
            }
        }
        days
    }

    /// Days of [`Year::weekdays`] whose date passes `keep`.
    fn weekdays_where(&self, keep: impl Fn(i32, i32, i32) -> bool) -> Vec<i32> {
        let end = days_in_year(self.year);
        self.weekdays()
            .into_iter()
            .filter(|d| (1..=end).contains(d))
            .filter(|&d| {
                let (y, m, day) = from_day_of_year(d, self.year);
                keep(y, m, day)
            })
            .collect()
    }

    fn weekdays_in_month(&self, month: i32) -> Vec<i32> {
        let year = self.year;
        let days: Vec<i32> = (1..=days_in_month(month, year))
            .filter(|&d| matches_by_day(self.by_day, year, month, d))
            .collect();
        let days = if self.rule.has(ByPart::BySetPos) {
            select_set_positions(&days, self.rule.by_set_pos())
        } else {
            days
        };
        days.into_iter()
            .map(|d| day_of_year(year, month, d))
            .collect()
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Stateful cursor producing the occurrences of a single recurrence rule.

mod state;
mod yearday;

use std::collections::BTreeMap;
use std::iter::FusedIterator;

pub use state::IteratorState;

use crate::RecurError;
use crate::config::Config;
use crate::iterator::yearday::expand_year_days;
use crate::value::calendar::{self, days_in_month, from_day_of_year};
use crate::value::{ByPart, CalendarTime, Frequency, RecurrenceRule, TimeField, WeekDayNum};

/// How a BY part acts for a given frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    /// Filters candidates produced at the rule's own granularity
    Contract,
    /// Generates candidates at a finer granularity
    Expand,
    /// Rejected by validation
    Illegal,
}

/// Roles per frequency, columns in the order
/// BYSECOND, BYMINUTE, BYHOUR, BYDAY, BYMONTHDAY, BYYEARDAY, BYWEEKNO, BYMONTH.
#[rustfmt::skip]
const ROLES: [[Role; 8]; 7] = {
    use Role::{Contract as C, Expand as E, Illegal as I};
    [
        [C, C, C, C, C, C, C, C], // SECONDLY
        [E, C, C, C, C, C, C, C], // MINUTELY
        [E, E, C, C, C, C, C, C], // HOURLY
        [E, E, E, C, C, C, C, C], // DAILY
        [E, E, E, E, I, I, C, C], // WEEKLY
        [E, E, E, E, E, I, I, C], // MONTHLY
        [E, E, E, E, E, E, E, E], // YEARLY
    ]
};

fn role(freq: Frequency, part: ByPart) -> Role {
    let column = match part {
        ByPart::BySecond => 0,
        ByPart::ByMinute => 1,
        ByPart::ByHour => 2,
        ByPart::ByDay => 3,
        ByPart::ByMonthDay => 4,
        ByPart::ByYearDay => 5,
        ByPart::ByWeekNo => 6,
        ByPart::ByMonth => 7,
        ByPart::BySetPos => return Role::Expand,
    };
    ROLES
        .get(freq as usize)
        .and_then(|row| row.get(column))
        .copied()
        .unwrap_or(Role::Contract)
}

/// The time-of-day units advanced by the generic routine
#[derive(Debug, Clone, Copy)]
enum Clock {
    Second,
    Minute,
    Hour,
}

impl Clock {
    const fn part(self) -> ByPart {
        match self {
            Clock::Second => ByPart::BySecond,
            Clock::Minute => ByPart::ByMinute,
            Clock::Hour => ByPart::ByHour,
        }
    }

    const fn freq(self) -> Frequency {
        match self {
            Clock::Second => Frequency::Secondly,
            Clock::Minute => Frequency::Minutely,
            Clock::Hour => Frequency::Hourly,
        }
    }

    const fn field(self) -> TimeField {
        match self {
            Clock::Second => TimeField::Second,
            Clock::Minute => TimeField::Minute,
            Clock::Hour => TimeField::Hour,
        }
    }

    const fn factor(self) -> i64 {
        match self {
            Clock::Second | Clock::Minute => 60,
            Clock::Hour => 24,
        }
    }

    const fn finer(self) -> Option<Clock> {
        match self {
            Clock::Second => None,
            Clock::Minute => Some(Clock::Second),
            Clock::Hour => Some(Clock::Minute),
        }
    }

    /// The next coarser unit, `None` for days.
    const fn coarser(self) -> Option<Clock> {
        match self {
            Clock::Second => Some(Clock::Minute),
            Clock::Minute => Some(Clock::Hour),
            Clock::Hour => None,
        }
    }
}

/// Outcome of one advance step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// `last` holds a candidate
    Valid,
    /// `last` moved but does not exist, e.g. day 31 of a short month
    Invalid,
    /// No further candidate can be found
    Exhausted,
}

/// Iterator over the occurrences of a [`RecurrenceRule`] from a start time
///
/// The start time is the first occurrence whenever it satisfies the rule. Occurrences are
/// produced in ascending order; once the iterator reports no more occurrences it stays
/// completed. Rules that can never match, such as the 30th of February, complete immediately
/// and report [`RecurIterator::is_unsatisfiable`].
#[derive(Debug, Clone)]
pub struct RecurIterator {
    rule: RecurrenceRule,
    dtstart: CalendarTime,
    last: CalendarTime,
    by_data: BTreeMap<ByPart, Vec<i32>>,
    by_day: Vec<WeekDayNum>,
    by_cursor: BTreeMap<ByPart, usize>,
    days: Vec<i32>,
    days_index: usize,
    occurrence_number: u32,
    completed: bool,
    unsatisfiable: bool,
    config: Config,
}

impl RecurrenceRule {
    /// Iterate the occurrences of this rule from `dtstart`.
    #[must_use]
    pub fn iterator(&self, dtstart: &CalendarTime) -> RecurIterator {
        RecurIterator::new(self.clone(), dtstart.clone())
    }
}

impl RecurIterator {
    /// Create an iterator with the default configuration.
    #[must_use]
    pub fn new(rule: RecurrenceRule, dtstart: CalendarTime) -> Self {
        Self::with_config(rule, dtstart, Config::default())
    }

    /// Create an iterator.
    #[must_use]
    pub fn with_config(rule: RecurrenceRule, mut dtstart: CalendarTime, config: Config) -> Self {
        dtstart.normalize();
        let by_data = [
            ByPart::BySecond,
            ByPart::ByMinute,
            ByPart::ByHour,
            ByPart::ByMonthDay,
            ByPart::ByYearDay,
            ByPart::ByWeekNo,
            ByPart::ByMonth,
            ByPart::BySetPos,
        ]
        .into_iter()
        .filter(|&part| rule.has(part))
        .map(|part| {
            let mut values = rule.values(part);
            values.sort_unstable();
            values.dedup();
            (part, values)
        })
        .collect();

        let mut iter = Self {
            by_day: rule.by_day().to_vec(),
            last: dtstart.clone(),
            rule,
            dtstart,
            by_data,
            by_cursor: BTreeMap::new(),
            days: Vec::new(),
            days_index: 0,
            occurrence_number: 0,
            completed: false,
            unsatisfiable: false,
            config,
        };
        iter.init();
        iter
    }

    /// The rule being iterated
    #[must_use]
    pub const fn rule(&self) -> &RecurrenceRule {
        &self.rule
    }

    /// The start of the recurrence
    #[must_use]
    pub const fn dtstart(&self) -> &CalendarTime {
        &self.dtstart
    }

    /// The most recent candidate; after a successful [`RecurIterator::next_occurrence`] this is
    /// the returned occurrence.
    #[must_use]
    pub const fn last(&self) -> &CalendarTime {
        &self.last
    }

    /// Number of occurrences produced so far
    #[must_use]
    pub const fn occurrence_number(&self) -> u32 {
        self.occurrence_number
    }

    /// Whether no further occurrences will be produced
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the rule was found to have no occurrences at all
    #[must_use]
    pub const fn is_unsatisfiable(&self) -> bool {
        self.unsatisfiable
    }

    /// Produce the next occurrence, or `None` once the recurrence is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::SameOccurrenceTwice`] when the rule keeps producing the same
    /// occurrence, which indicates an internally contradictory rule.
    pub fn next_occurrence(&mut self) -> Result<Option<CalendarTime>, RecurError> {
        if self.completed {
            return Ok(None);
        }

        let count_reached = self
            .rule
            .count()
            .is_some_and(|count| self.occurrence_number >= count);
        if count_reached || self.is_past_until(&self.last) {
            self.finish();
            return Ok(None);
        }

        if self.occurrence_number == 0
            && self.last >= self.dtstart
            && self.check_contracting_rules()
        {
            self.occurrence_number += 1;
            return Ok(Some(self.last.clone()));
        }

        let mut retries = 0;
        loop {
            let before = self.last.clone();
            if !self.advance()? {
                self.finish();
                return Ok(None);
            }
            if self.last != before {
                break;
            }
            if retries >= self.config.same_occurrence_retries {
                self.completed = true;
                return Err(RecurError::SameOccurrenceTwice {
                    occurrence: self.last.to_string(),
                });
            }
            retries += 1;
        }

        if self.is_past_until(&self.last) {
            self.finish();
            return Ok(None);
        }

        self.occurrence_number += 1;
        Ok(Some(self.last.clone()))
    }

    /// Snapshot of the complete iteration state.
    #[must_use]
    pub fn state(&self) -> IteratorState {
        IteratorState {
            rule: self.rule.clone(),
            dtstart: self.dtstart.clone(),
            last: self.last.clone(),
            by_data: self.by_data.clone(),
            by_day: self.by_day.clone(),
            by_cursor: self.by_cursor.clone(),
            days: self.days.clone(),
            days_index: self.days_index,
            occurrence_number: self.occurrence_number,
            completed: self.completed,
            unsatisfiable: self.unsatisfiable,
            config: self.config,
        }
    }

    /// Resume from a snapshot taken by [`RecurIterator::state`].
    #[must_use]
    pub fn from_state(state: IteratorState) -> Self {
        Self {
            rule: state.rule,
            dtstart: state.dtstart,
            last: state.last,
            by_data: state.by_data,
            by_day: state.by_day,
            by_cursor: state.by_cursor,
            days: state.days,
            days_index: state.days_index,
            occurrence_number: state.occurrence_number,
            completed: state.completed,
            unsatisfiable: state.unsatisfiable,
            config: state.config,
        }
    }

    fn init(&mut self) {
        let start = self.dtstart.parts();
        let wkst = self.rule.week_start();
        self.by_day.sort_by_key(|d| d.day.position_from(wkst));
        if !self.month_days_can_match() {
            self.mark_unsatisfiable();
            return;
        }

        let second = self.setup_default(Clock::Second.part(), Frequency::Secondly, start.second);
        let minute = self.setup_default(Clock::Minute.part(), Frequency::Minutely, start.minute);
        let hour = self.setup_default(Clock::Hour.part(), Frequency::Hourly, start.hour);
        let day = self.setup_default(ByPart::ByMonthDay, Frequency::Daily, start.day);
        let month = self.setup_default(ByPart::ByMonth, Frequency::Monthly, start.month);
        self.last.set(TimeField::Second, second);
        self.last.set(TimeField::Minute, minute);
        self.last.set(TimeField::Hour, hour);

        match self.rule.freq() {
            Frequency::Weekly => {
                self.last.set_date(start.year, month, day);
                self.last.normalize();
                if let Some(first) = self.by_day.first().filter(|_| self.rule.has(ByPart::ByDay)) {
                    let shift = i32::from(first.day.position_from(wkst))
                        - i32::from(self.last.day_of_week(wkst));
                    self.last.adjust(i64::from(shift), 0, 0, 0);
                } else {
                    self.by_day = vec![WeekDayNum::every(self.dtstart.weekday())];
                }
            }
            Frequency::Monthly if self.has_day_selection() => {
                self.last.set_date(start.year, start.month, 1);
                self.last.normalize();
                if !self.seek_month_candidate(0) {
                    self.mark_unsatisfiable();
                    return;
                }
            }
            Frequency::Yearly => {
                let mut year = start.year;
                loop {
                    self.days = expand_year_days(&self.rule, &self.by_day, &start, year);
                    if !self.days.is_empty() {
                        break;
                    }
                    year += self.interval();
                    if year > self.year_ceiling() {
                        self.mark_unsatisfiable();
                        return;
                    }
                }
                self.last.set_date(year, 1, 1);
                self.apply_year_day();
            }
            _ => self.last.set_date(start.year, month, day),
        }
        self.last.normalize();

        tracing::debug!(
            rule = %self.rule,
            start = %self.dtstart,
            first = %self.last,
            "initialized recurrence iterator"
        );
    }

    /// Seed the working list of a part that is not contracting with the start value.
    ///
    /// Returns the value `last` starts with for that unit.
    fn setup_default(&mut self, part: ByPart, unit: Frequency, default: i32) -> i32 {
        let freq = self.rule.freq();
        if role(freq, part) == Role::Contract {
            return default;
        }
        let values = self.by_data.entry(part).or_insert_with(|| vec![default]);
        match values.first() {
            Some(&first) if freq != unit => first,
            _ => default,
        }
    }

    /// Advance until a candidate passes every check, or report exhaustion.
    fn advance(&mut self) -> Result<bool, RecurError> {
        let ceiling = self.year_ceiling();
        let limit = self.config.max_skipped_candidates;
        let mut skipped = 0;
        loop {
            let step = match self.rule.freq() {
                Frequency::Secondly => {
                    self.next_clock(Clock::Second);
                    Step::Valid
                }
                Frequency::Minutely => {
                    self.next_clock(Clock::Minute);
                    Step::Valid
                }
                Frequency::Hourly => {
                    self.next_clock(Clock::Hour);
                    Step::Valid
                }
                Frequency::Daily => self.next_day(),
                Frequency::Weekly => self.next_week(),
                Frequency::Monthly => self.next_month(),
                Frequency::Yearly => self.next_year(),
            };
            self.last.normalize();

            if step == Step::Exhausted || self.last.year() > ceiling {
                return Ok(false);
            }
            if step == Step::Valid && self.check_contracting_rules() && self.last >= self.dtstart {
                return Ok(true);
            }
            tracing::trace!(candidate = %self.last, "skipping recurrence candidate");

            skipped += 1;
            if skipped > limit {
                tracing::warn!(
                    rule = %self.rule,
                    candidate = %self.last,
                    limit,
                    "too many rejected recurrence candidates"
                );
                self.completed = true;
                return Err(RecurError::IterationLimit { limit });
            }
        }
    }

    /// Generic advance of a time-of-day unit.
    ///
    /// Returns `true` when the unit's list of values wrapped around, or when the unit has no
    /// list, meaning the next coarser unit has to move.
    fn next_clock(&mut self, clock: Clock) -> bool {
        if let Some(finer) = clock.finer()
            && !self.next_clock(finer)
        {
            return false;
        }

        let part = clock.part();
        let this_freq = self.rule.freq() == clock.freq();
        let Some(values) = self.by_data.get(&part).filter(|v| !v.is_empty()) else {
            if this_freq {
                self.increment_clock(clock, i64::from(self.rule.interval()));
            }
            return true;
        };

        let mut index = self.cursor(part) + 1;
        let mut end_of_data = false;
        if index >= values.len() {
            index = 0;
            end_of_data = true;
        }
        let value = values.get(index).copied().unwrap_or_default();
        self.by_cursor.insert(part, index);
        self.last.set(clock.field(), value);

        if end_of_data && this_freq {
            self.increment_coarser(clock, 1);
        }
        end_of_data
    }

    fn increment_clock(&mut self, clock: Clock, inc: i64) {
        let value = i64::from(self.last.get(clock.field())) + inc;
        let carry = value.div_euclid(clock.factor());
        let wrapped = i32::try_from(value.rem_euclid(clock.factor())).unwrap_or_default();
        self.last.set(clock.field(), wrapped);
        self.last.normalize();
        if carry != 0 {
            self.increment_coarser(clock, carry);
        }
    }

    fn increment_coarser(&mut self, clock: Clock, inc: i64) {
        match clock.coarser() {
            Some(coarser) => self.increment_clock(coarser, inc),
            None => self.increment_monthday(inc),
        }
    }

    fn increment_monthday(&mut self, inc: i64) {
        for _ in 0..inc {
            let day = self.last.day() + 1;
            if day > days_in_month(self.last.month(), self.last.year()) {
                self.increment_month();
            } else {
                self.last.set(TimeField::Day, day);
            }
        }
    }

    /// Move to the first day of the next month, or of the month INTERVAL months ahead for
    /// MONTHLY rules.
    fn increment_month(&mut self) {
        let step = match self.rule.freq() {
            Frequency::Monthly => self.interval(),
            _ => 1,
        };
        let months = self.last.month() - 1 + step;
        let year = self.last.year() + months.div_euclid(12);
        self.last.set_date(year, months.rem_euclid(12) + 1, 1);
        self.last.normalize();
    }

    fn next_day(&mut self) -> Step {
        if !self.next_clock(Clock::Hour) {
            return Step::Valid;
        }
        let inc = match self.rule.freq() {
            Frequency::Daily => self.interval(),
            _ => 1,
        };
        self.increment_monthday(i64::from(inc));
        Step::Valid
    }

    fn next_week(&mut self) -> Step {
        if self.next_weekday_by_week() {
            self.increment_monthday(7 * i64::from(self.interval()));
        }
        Step::Valid
    }

    /// Move to the next BYDAY entry of the current week.
    ///
    /// Returns `true` when the list wrapped around and the week has to move.
    fn next_weekday_by_week(&mut self) -> bool {
        if !self.next_clock(Clock::Hour) {
            return false;
        }
        if !self.rule.has(ByPart::ByDay) {
            return true;
        }

        let wkst = self.rule.week_start();
        let mut end_of_data = false;
        for _ in 0..=self.by_day.len() {
            let mut index = self.cursor(ByPart::ByDay) + 1;
            if index >= self.by_day.len() {
                index = 0;
                end_of_data = true;
            }
            self.by_cursor.insert(ByPart::ByDay, index);
            let Some(entry) = self.by_day.get(index) else {
                return true;
            };

            let offset = i32::from(entry.day.position_from(wkst)) - 1;
            let start_of_week = self.last.start_doy_week(wkst);
            if offset + start_of_week < 1 && !end_of_data {
                // The day lies in the previous year
                continue;
            }
            let (year, month, day) = from_day_of_year(start_of_week + offset, self.last.year());
            self.last.set_date(year, month, day);
            self.last.normalize();
            return end_of_data;
        }
        true
    }

    fn next_month(&mut self) -> Step {
        if !self.next_clock(Clock::Hour) {
            return Step::Valid;
        }

        if self.has_day_selection() {
            let (year, month, day) = self.last.parts().date();
            if let Some(next) = self
                .month_candidates(year, month)
                .into_iter()
                .find(|&d| d > day)
            {
                self.last.set(TimeField::Day, next);
                return Step::Valid;
            }
            self.increment_month();
            return if self.seek_month_candidate(1) {
                Step::Valid
            } else {
                Step::Exhausted
            };
        }

        self.increment_month();
        let day = self
            .by_data
            .get(&ByPart::ByMonthDay)
            .and_then(|v| v.first().copied())
            .unwrap_or_else(|| self.dtstart.day());
        if day > days_in_month(self.last.month(), self.last.year()) {
            return Step::Invalid;
        }
        self.last.set(TimeField::Day, day);
        Step::Valid
    }

    /// Move `last` to the first candidate day of its month, trying following months when the
    /// month has none.
    fn seek_month_candidate(&mut self, tried: u32) -> bool {
        for _ in tried..=self.config.monthly_search_months {
            let (year, month, _) = self.last.parts().date();
            if let Some(&first) = self.month_candidates(year, month).first() {
                self.last.set(TimeField::Day, first);
                return true;
            }
            self.increment_month();
        }
        tracing::warn!(
            rule = %self.rule,
            months = self.config.monthly_search_months,
            "no monthly candidate found"
        );
        false
    }

    /// Days of a month matching BYDAY and BYMONTHDAY, filtered by BYSETPOS.
    fn month_candidates(&self, year: i32, month: i32) -> Vec<i32> {
        let dim = days_in_month(month, year);
        let month_days = self
            .rule
            .has(ByPart::ByMonthDay)
            .then(|| normalize_month_days(&self.rule.values(ByPart::ByMonthDay), dim));

        let days: Vec<i32> = (1..=dim)
            .filter(|&d| {
                !self.rule.has(ByPart::ByDay) || matches_by_day(&self.by_day, year, month, d)
            })
            .filter(|d| month_days.as_ref().is_none_or(|list| list.contains(d)))
            .collect();

        if self.rule.has(ByPart::BySetPos) {
            select_set_positions(&days, self.rule.by_set_pos())
        } else {
            days
        }
    }

    fn next_year(&mut self) -> Step {
        if !self.next_clock(Clock::Hour) {
            return Step::Valid;
        }

        self.days_index += 1;
        if self.days_index >= self.days.len() {
            self.days_index = 0;
            let start = self.dtstart.parts();
            let mut year = self.last.year();
            loop {
                year += self.interval();
                if year > self.year_ceiling() {
                    return Step::Exhausted;
                }
                self.days = expand_year_days(&self.rule, &self.by_day, &start, year);
                if !self.days.is_empty() {
                    break;
                }
            }
            self.last.set_date(year, 1, 1);
        }
        self.apply_year_day();
        Step::Valid
    }

    fn apply_year_day(&mut self) {
        if let Some(&doy) = self.days.get(self.days_index) {
            let (year, month, day) = from_day_of_year(doy, self.last.year());
            self.last.set_date(year, month, day);
            self.last.normalize();
        }
    }

    fn check_contracting_rules(&self) -> bool {
        let freq = self.rule.freq();
        let contracts = |part| role(freq, part) == Role::Contract && self.rule.has(part);
        let (year, month, day) = self.last.parts().date();
        let wkst = self.rule.week_start();
        let listed = |part, value: i32| {
            !contracts(part)
                || self
                    .by_data
                    .get(&part)
                    .is_some_and(|values| values.contains(&value))
        };

        listed(ByPart::BySecond, self.last.second())
            && listed(ByPart::ByMinute, self.last.minute())
            && listed(ByPart::ByHour, self.last.hour())
            && (!contracts(ByPart::ByDay)
                || self
                    .by_day
                    .iter()
                    .any(|d| d.occurrence.is_none() && d.day == self.last.weekday()))
            && (!contracts(ByPart::ByWeekNo) || {
                let week = self.last.week_number(wkst);
                let weeks = calendar::week_number(year, 12, 28, wkst);
                self.rule
                    .values(ByPart::ByWeekNo)
                    .iter()
                    .any(|&w| w == week || w + weeks + 1 == week)
            })
            && (!contracts(ByPart::ByMonthDay)
                || normalize_month_days(
                    &self.rule.values(ByPart::ByMonthDay),
                    days_in_month(month, year),
                )
                .contains(&day))
            && listed(ByPart::ByMonth, month)
            && (!contracts(ByPart::ByYearDay) || {
                let doy = self.last.day_of_year();
                let diy = calendar::days_in_year(year);
                self.rule
                    .values(ByPart::ByYearDay)
                    .iter()
                    .any(|&d| d == doy || d + diy + 1 == doy)
            })
    }

    /// Whether some listed month is long enough for some BYMONTHDAY value.
    fn month_days_can_match(&self) -> bool {
        let rule = &self.rule;
        if !rule.has(ByPart::ByMonth) || !rule.has(ByPart::ByMonthDay) {
            return true;
        }
        // 2000 is a leap year, so every month has its longest length
        rule.by_month().iter().any(|&month| {
            let longest = days_in_month(i32::from(month), 2000);
            rule.by_month_day()
                .iter()
                .any(|&day| i32::from(day).abs() <= longest)
        })
    }

    fn has_day_selection(&self) -> bool {
        self.rule.has(ByPart::ByDay) || self.rule.has(ByPart::ByMonthDay)
    }

    fn cursor(&self, part: ByPart) -> usize {
        self.by_cursor.get(&part).copied().unwrap_or_default()
    }

    fn interval(&self) -> i32 {
        i32::try_from(self.rule.interval()).unwrap_or(i32::MAX)
    }

    /// Last year searched for occurrences.
    fn year_ceiling(&self) -> i32 {
        match self.rule.until() {
            Some(until) => until.year() + 1,
            None => self
                .dtstart
                .year()
                .saturating_add(self.config.yearly_search_years),
        }
    }

    fn is_past_until(&self, time: &CalendarTime) -> bool {
        match self.rule.until() {
            Some(until) if until.is_date() => time.compare_date_only(until).is_gt(),
            Some(until) => time > until,
            None => false,
        }
    }

    fn mark_unsatisfiable(&mut self) {
        tracing::warn!(
            rule = %self.rule,
            start = %self.dtstart,
            "recurrence rule has no occurrences"
        );
        self.unsatisfiable = true;
        self.completed = true;
    }

    fn finish(&mut self) {
        if !self.completed {
            tracing::debug!(
                rule = %self.rule,
                count = self.occurrence_number,
                "recurrence iterator completed"
            );
        }
        if self.occurrence_number == 0 {
            self.unsatisfiable = true;
        }
        self.completed = true;
    }
}

impl Iterator for RecurIterator {
    type Item = Result<CalendarTime, RecurError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_occurrence().transpose()
    }
}

impl FusedIterator for RecurIterator {}

/// Whether a date matches any BYDAY designator, ordinals counted within the month.
fn matches_by_day(by_day: &[WeekDayNum], year: i32, month: i32, day: i32) -> bool {
    let weekday = calendar::weekday(year, month, day);
    by_day.iter().any(|d| {
        d.day == weekday && calendar::is_nth_weekday(year, month, day, d.day, d.position())
    })
}

/// Map BYMONTHDAY values onto days of a month with `dim` days, dropping those that do not exist.
fn normalize_month_days(values: &[i32], dim: i32) -> Vec<i32> {
    let mut days: Vec<i32> = values
        .iter()
        .map(|&v| if v < 0 { v + dim + 1 } else { v })
        .filter(|d| (1..=dim).contains(d))
        .collect();
    days.sort_unstable();
    days.dedup();
    days
}

/// Keep the candidates whose 1-based position, or negative position from the end, is listed.
fn select_set_positions(candidates: &[i32], positions: &[i16]) -> Vec<i32> {
    let len = i32::try_from(candidates.len()).unwrap_or(i32::MAX);
    candidates
        .iter()
        .zip(1..)
        .filter(|&(_, pos)| {
            positions
                .iter()
                .any(|&p| i32::from(p) == pos || i32::from(p) == pos - len - 1)
        })
        .map(|(&d, _)| d)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::WeekDay;

    fn collect(rule: &RecurrenceRule, start: &CalendarTime, limit: usize) -> Vec<String> {
        rule.iterator(start)
            .take(limit)
            .map(|t| t.unwrap().to_string())
            .collect()
    }

    #[test]
    fn assigns_roles_per_frequency() {
        assert_eq!(role(Frequency::Daily, ByPart::ByHour), Role::Expand);
        assert_eq!(role(Frequency::Daily, ByPart::ByDay), Role::Contract);
        assert_eq!(role(Frequency::Weekly, ByPart::ByMonthDay), Role::Illegal);
        assert_eq!(role(Frequency::Monthly, ByPart::ByMonth), Role::Contract);
        assert_eq!(role(Frequency::Yearly, ByPart::ByWeekNo), Role::Expand);
    }

    #[test]
    fn normalizes_negative_month_days() {
        assert_eq!(normalize_month_days(&[-1, 1, 31, 30, 1], 30), vec![1, 30]);
        assert_eq!(normalize_month_days(&[-31], 30), Vec::<i32>::new());
    }

    #[test]
    fn selects_set_positions() {
        let days = [1, 2, 3, 4, 5];
        assert_eq!(select_set_positions(&days, &[1, -1]), vec![1, 5]);
        assert_eq!(select_set_positions(&days, &[-2]), vec![4]);
        assert_eq!(select_set_positions(&days, &[6]), Vec::<i32>::new());
    }

    #[test]
    fn seeds_defaults_from_start() {
        let rule = RecurrenceRule::builder(Frequency::Daily).count(2).build().unwrap();
        let start = CalendarTime::datetime(2024, 1, 1, 9, 30, 15);
        let iter = rule.iterator(&start);
        let state = iter.state();
        assert_eq!(state.by_data.get(&ByPart::ByHour), Some(&vec![9]));
        assert_eq!(state.by_data.get(&ByPart::ByMinute), Some(&vec![30]));
        assert_eq!(state.by_data.get(&ByPart::BySecond), Some(&vec![15]));
        assert!(!state.by_data.contains_key(&ByPart::ByMonth));
    }

    #[test]
    fn expands_hours_within_day() {
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .by_hour([9, 17])
            .count(4)
            .build()
            .unwrap();
        let start = CalendarTime::datetime(2024, 1, 1, 9, 0, 0);
        assert_eq!(
            collect(&rule, &start, 10),
            vec!["20240101T090000", "20240101T170000", "20240102T090000", "20240102T170000"]
        );
    }

    #[test]
    fn walks_unsorted_hours_in_order() {
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .by_hour([17, 9, 17])
            .count(4)
            .build()
            .unwrap();
        let start = CalendarTime::datetime(2024, 1, 1, 0, 0, 0);
        assert_eq!(
            collect(&rule, &start, 10),
            vec!["20240101T090000", "20240101T170000", "20240102T090000", "20240102T170000"]
        );
        let state = rule.iterator(&start).state();
        assert_eq!(state.by_data.get(&ByPart::ByHour), Some(&vec![9, 17]));
    }

    #[test]
    fn carries_minutely_interval_into_hours() {
        let rule = RecurrenceRule::builder(Frequency::Minutely)
            .interval(25)
            .count(4)
            .build()
            .unwrap();
        let start = CalendarTime::datetime(2024, 1, 31, 23, 10, 0);
        assert_eq!(
            collect(&rule, &start, 10),
            vec!["20240131T231000", "20240131T233500", "20240201T000000", "20240201T002500"]
        );
    }

    #[test]
    fn filters_by_contracting_parts() {
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .by_day([WeekDayNum::every(WeekDay::Saturday), WeekDayNum::every(WeekDay::Sunday)])
            .count(3)
            .build()
            .unwrap();
        let start = CalendarTime::date(2024, 1, 1);
        assert_eq!(collect(&rule, &start, 10), vec!["20240106", "20240107", "20240113"]);
    }

    #[test]
    fn wraps_seconds_into_following_minute() {
        let rule = RecurrenceRule::builder(Frequency::Secondly)
            .by_second([5])
            .count(3)
            .build()
            .unwrap();
        let start = CalendarTime::datetime(2024, 1, 1, 0, 0, 5);
        assert_eq!(
            collect(&rule, &start, 10),
            vec!["20240101T000005", "20240101T000105", "20240101T000205"]
        );
    }

    #[test]
    fn ends_when_month_days_never_fit() {
        let start = CalendarTime::date(2024, 1, 1);
        for day in [30, -30] {
            let rule = RecurrenceRule::builder(Frequency::Daily)
                .by_month([2])
                .by_month_day([day])
                .build()
                .unwrap();
            let mut iter = rule.iterator(&start);
            assert_eq!(iter.next_occurrence().unwrap(), None);
            assert!(iter.is_unsatisfiable());
        }

        let rule = RecurrenceRule::builder(Frequency::Daily)
            .by_month([2, 4])
            .by_month_day([30])
            .build()
            .unwrap();
        assert_eq!(collect(&rule, &start, 1), vec!["20240430"]);
    }

    #[test]
    fn bounds_rejected_candidates_per_step() {
        let rule = RecurrenceRule::builder(Frequency::Daily)
            .by_month([12])
            .build()
            .unwrap();
        let start = CalendarTime::date(2024, 1, 1);
        let config = Config {
            max_skipped_candidates: 100,
            ..Config::default()
        };
        let mut iter = RecurIterator::with_config(rule.clone(), start.clone(), config);
        assert_eq!(
            iter.next_occurrence(),
            Err(RecurError::IterationLimit { limit: 100 })
        );
        assert!(iter.is_completed());
        assert!(iter.next().is_none());

        assert_eq!(collect(&rule, &start, 1), vec!["20241201"]);
    }

    #[test]
    fn retries_a_repeated_occurrence_once() {
        let rule = RecurrenceRule::builder(Frequency::Yearly).build().unwrap();
        let start = CalendarTime::date(2024, 1, 10);
        let mut iter = rule.iterator(&start);
        assert_eq!(iter.next_occurrence().unwrap(), Some(start.clone()));

        let mut state = iter.state();
        state.days = vec![10, 10];
        let mut resumed = RecurIterator::from_state(state.clone());
        assert_eq!(
            resumed.next_occurrence().unwrap(),
            Some(CalendarTime::date(2025, 1, 10))
        );

        state.config.same_occurrence_retries = 0;
        let mut strict = RecurIterator::from_state(state);
        let result = strict.next_occurrence();
        assert!(matches!(result, Err(RecurError::SameOccurrenceTwice { .. })));
        assert!(strict.is_completed());
        assert!(strict.next().is_none());
    }
}

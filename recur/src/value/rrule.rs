// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Validated recurrence rules as defined in RFC 5545 Section 3.3.10.

use std::collections::HashSet;
use std::fmt::{self, Display};

use crate::RecurError;
use crate::keyword::{
    KW_RRULE_COUNT, KW_RRULE_FREQ, KW_RRULE_INTERVAL, KW_RRULE_UNTIL, KW_RRULE_WKST,
};
use crate::value::{CalendarTime, WeekDay, WeekDayNum};

/// Recurrence frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

/// The BY* rule parts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumString, strum::IntoStaticStr)]
#[derive(serde::Serialize, serde::Deserialize)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
#[expect(missing_docs)]
pub enum ByPart {
    BySecond,
    ByMinute,
    ByHour,
    ByDay,
    ByMonthDay,
    ByYearDay,
    ByWeekNo,
    ByMonth,
    BySetPos,
}

/// A single `name=value` part of a rule, as handed over by a parser
#[derive(Debug, Clone)]
#[expect(missing_docs)]
pub enum RulePart {
    Freq(Frequency),
    Until(CalendarTime),
    Count(u32),
    Interval(u32),
    BySecond(Vec<u8>),
    ByMinute(Vec<u8>),
    ByHour(Vec<u8>),
    ByMonthDay(Vec<i8>),
    ByYearDay(Vec<i16>),
    ByWeekNo(Vec<i8>),
    ByMonth(Vec<u8>),
    ByDay(Vec<WeekDayNum>),
    BySetPos(Vec<i16>),
    Wkst(WeekDay),
}

impl RulePart {
    /// Name of the part as written in a rule.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            RulePart::Freq(_) => KW_RRULE_FREQ,
            RulePart::Until(_) => KW_RRULE_UNTIL,
            RulePart::Count(_) => KW_RRULE_COUNT,
            RulePart::Interval(_) => KW_RRULE_INTERVAL,
            RulePart::Wkst(_) => KW_RRULE_WKST,
            RulePart::BySecond(_) => ByPart::BySecond.into(),
            RulePart::ByMinute(_) => ByPart::ByMinute.into(),
            RulePart::ByHour(_) => ByPart::ByHour.into(),
            RulePart::ByMonthDay(_) => ByPart::ByMonthDay.into(),
            RulePart::ByYearDay(_) => ByPart::ByYearDay.into(),
            RulePart::ByWeekNo(_) => ByPart::ByWeekNo.into(),
            RulePart::ByMonth(_) => ByPart::ByMonth.into(),
            RulePart::ByDay(_) => ByPart::ByDay.into(),
            RulePart::BySetPos(_) => ByPart::BySetPos.into(),
        }
    }
}

/// Recurrence rule
///
/// Always structurally valid: construction goes through [`RecurrenceRule::from_parts`] or
/// [`RecurrenceRuleBuilder::build`], which reject illegal combinations and out-of-range values.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "RecurrenceRuleBuilder")]
pub struct RecurrenceRule {
    freq: Frequency,
    until: Option<CalendarTime>,
    count: Option<u32>,
    interval: u32,
    by_second: Vec<u8>,
    by_minute: Vec<u8>,
    by_hour: Vec<u8>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<u8>,
    by_day: Vec<WeekDayNum>,
    by_set_pos: Vec<i16>,
    wkst: WeekDay,
}

impl RecurrenceRule {
    /// Start building a rule of the given frequency.
    #[must_use]
    pub fn builder(freq: Frequency) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::default().freq(freq)
    }

    /// Build a rule from its parts.
    ///
    /// # Errors
    ///
    /// Returns an error if a part is repeated, FREQ is missing, or the resulting rule is invalid.
    pub fn from_parts<I>(parts: I) -> Result<Self, RecurError>
    where
        I: IntoIterator<Item = RulePart>,
    {
        let mut seen = HashSet::new();
        let mut builder = RecurrenceRuleBuilder::default();
        for part in parts {
            let name = part.name();
            if !seen.insert(name) {
                return Err(RecurError::DuplicatePart { part: name });
            }
            builder = builder.part(part);
        }
        builder.build()
    }

    /// Frequency of recurrence
    #[must_use]
    pub const fn freq(&self) -> Frequency {
        self.freq
    }

    /// Inclusive end of the recurrence
    #[must_use]
    pub const fn until(&self) -> Option<&CalendarTime> {
        self.until.as_ref()
    }

    /// Number of occurrences
    #[must_use]
    pub const fn count(&self) -> Option<u32> {
        self.count
    }

    /// Interval between recurrences, 1 unless specified
    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    /// Start day of the week, Monday unless specified
    #[must_use]
    pub const fn week_start(&self) -> WeekDay {
        self.wkst
    }

    /// Second specifier
    #[must_use]
    pub fn by_second(&self) -> &[u8] {
        &self.by_second
    }

    /// Minute specifier
    #[must_use]
    pub fn by_minute(&self) -> &[u8] {
        &self.by_minute
    }

    /// Hour specifier
    #[must_use]
    pub fn by_hour(&self) -> &[u8] {
        &self.by_hour
    }

    /// Day of month specifier
    #[must_use]
    pub fn by_month_day(&self) -> &[i8] {
        &self.by_month_day
    }

    /// Day of year specifier
    #[must_use]
    pub fn by_year_day(&self) -> &[i16] {
        &self.by_year_day
    }

    /// Week number specifier
    #[must_use]
    pub fn by_week_no(&self) -> &[i8] {
        &self.by_week_no
    }

    /// Month specifier
    #[must_use]
    pub fn by_month(&self) -> &[u8] {
        &self.by_month
    }

    /// Day of week specifier
    #[must_use]
    pub fn by_day(&self) -> &[WeekDayNum] {
        &self.by_day
    }

    /// Position within the set of candidates of an interval
    #[must_use]
    pub fn by_set_pos(&self) -> &[i16] {
        &self.by_set_pos
    }

    /// Whether the rule restricts the given part.
    #[must_use]
    pub fn has(&self, part: ByPart) -> bool {
        match part {
            ByPart::BySecond => !self.by_second.is_empty(),
            ByPart::ByMinute => !self.by_minute.is_empty(),
            ByPart::ByHour => !self.by_hour.is_empty(),
            ByPart::ByDay => !self.by_day.is_empty(),
            ByPart::ByMonthDay => !self.by_month_day.is_empty(),
            ByPart::ByYearDay => !self.by_year_day.is_empty(),
            ByPart::ByWeekNo => !self.by_week_no.is_empty(),
            ByPart::ByMonth => !self.by_month.is_empty(),
            ByPart::BySetPos => !self.by_set_pos.is_empty(),
        }
    }

    /// Numeric values of a part, widened to `i32`; empty for BYDAY.
    #[must_use]
    pub fn values(&self, part: ByPart) -> Vec<i32> {
        match part {
            ByPart::BySecond => widen(&self.by_second),
            ByPart::ByMinute => widen(&self.by_minute),
            ByPart::ByHour => widen(&self.by_hour),
            ByPart::ByMonthDay => widen(&self.by_month_day),
            ByPart::ByYearDay => widen(&self.by_year_day),
            ByPart::ByWeekNo => widen(&self.by_week_no),
            ByPart::ByMonth => widen(&self.by_month),
            ByPart::BySetPos => widen(&self.by_set_pos),
            ByPart::ByDay => Vec::new(),
        }
    }

    /// Whether the recurrence ends, either by COUNT or by UNTIL.
    #[must_use]
    pub const fn is_finite(&self) -> bool {
        self.count.is_some() || self.until.is_some()
    }

    /// Whether the recurrence ends by COUNT.
    #[must_use]
    pub const fn is_by_count(&self) -> bool {
        self.count.is_some() && self.until.is_none()
    }

    /// Replace UNTIL, keeping every other part.
    pub(crate) fn set_until(&mut self, until: Option<CalendarTime>) {
        self.until = until;
    }

    fn validate(&self) -> Result<(), RecurError> {
        if self.interval == 0 {
            return Err(RecurError::ZeroInterval);
        }
        if self.count == Some(0) {
            return Err(RecurError::ZeroCount);
        }
        if self.until.is_some() && self.count.is_some() {
            return Err(RecurError::CountAndUntil);
        }

        check(ByPart::BySecond, &self.by_second, |v| (0..=60).contains(&v))?;
        check(ByPart::ByMinute, &self.by_minute, |v| (0..=59).contains(&v))?;
        check(ByPart::ByHour, &self.by_hour, |v| (0..=23).contains(&v))?;
        check(ByPart::ByMonthDay, &self.by_month_day, signed(31))?;
        check(ByPart::ByYearDay, &self.by_year_day, signed(366))?;
        check(ByPart::ByWeekNo, &self.by_week_no, signed(53))?;
        check(ByPart::ByMonth, &self.by_month, |v| (1..=12).contains(&v))?;
        check(ByPart::BySetPos, &self.by_set_pos, signed(366))?;
        self.validate_by_day()?;
        self.validate_combinations()
    }

    fn validate_by_day(&self) -> Result<(), RecurError> {
        let ordinals = self.by_day.iter().filter_map(|d| d.occurrence);
        let limit = match self.freq {
            Frequency::Monthly => 5,
            Frequency::Yearly if !self.has(ByPart::ByMonth) => 53,
            Frequency::Yearly => 5,
            _ => {
                if self.by_day.iter().any(|d| d.occurrence.is_some()) {
                    return Err(incompatible(format!(
                        "ordinal BYDAY values are not allowed in {} rules",
                        self.freq
                    )));
                }
                return Ok(());
            }
        };
        if self.freq == Frequency::Yearly
            && self.has(ByPart::ByWeekNo)
            && self.by_day.iter().any(|d| d.occurrence.is_some())
        {
            return Err(incompatible(
                "ordinal BYDAY values are not allowed together with BYWEEKNO".to_owned(),
            ));
        }
        for n in ordinals {
            let value = i32::from(n);
            if value == 0 || value.abs() > limit {
                return Err(RecurError::OutOfRange {
                    part: ByPart::ByDay,
                    value,
                });
            }
        }
        Ok(())
    }

    fn validate_combinations(&self) -> Result<(), RecurError> {
        use ByPart::{ByMonth, ByMonthDay, ByWeekNo, ByYearDay};

        let conflicts: [(bool, &str); 7] = [
            (
                self.has(ByYearDay)
                    && (self.has(ByMonth) || self.has(ByWeekNo) || self.has(ByMonthDay)),
                "BYYEARDAY may only appear without BYMONTH, BYWEEKNO and BYMONTHDAY",
            ),
            (
                self.has(ByWeekNo) && self.has(ByMonthDay),
                "BYWEEKNO does not fit to BYMONTHDAY",
            ),
            (
                self.freq == Frequency::Monthly && self.has(ByYearDay),
                "MONTHLY rules cannot use BYYEARDAY",
            ),
            (
                self.freq == Frequency::Monthly && self.has(ByWeekNo),
                "MONTHLY rules cannot use BYWEEKNO",
            ),
            (
                self.freq == Frequency::Weekly && self.has(ByYearDay),
                "WEEKLY rules cannot use BYYEARDAY",
            ),
            (
                self.freq == Frequency::Weekly && self.has(ByMonthDay),
                "WEEKLY rules cannot use BYMONTHDAY",
            ),
            (
                self.freq != Frequency::Yearly && self.has(ByYearDay),
                "BYYEARDAY may only appear in YEARLY rules",
            ),
        ];

        match conflicts.iter().find(|(conflict, _)| *conflict) {
            Some((_, message)) => Err(incompatible((*message).to_owned())),
            None => Ok(()),
        }
    }
}

fn widen<T: Copy + Into<i32>>(values: &[T]) -> Vec<i32> {
    values.iter().map(|&v| v.into()).collect()
}

fn signed(limit: i32) -> impl Fn(i32) -> bool {
    move |v| v != 0 && v.abs() <= limit
}

fn check<T, F>(part: ByPart, values: &[T], valid: F) -> Result<(), RecurError>
where
    T: Copy + Into<i32>,
    F: Fn(i32) -> bool,
{
    match values.iter().map(|&v| v.into()).find(|&v| !valid(v)) {
        Some(value) => Err(RecurError::OutOfRange { part, value }),
        None => Ok(()),
    }
}

fn incompatible(message: String) -> RecurError {
    RecurError::IncompatibleParts { message }
}

impl Display for RecurrenceRule {
    /// Format in the textual rule syntax, e.g. `FREQ=MONTHLY;COUNT=3;BYDAY=-1FR`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: Display>(f: &mut fmt::Formatter<'_>, name: &str, values: &[T]) -> fmt::Result {
            if values.is_empty() {
                return Ok(());
            }
            write!(f, ";{name}=")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{v}")?;
            }
            Ok(())
        }

        write!(f, "{KW_RRULE_FREQ}={}", self.freq)?;
        if let Some(until) = &self.until {
            write!(f, ";{KW_RRULE_UNTIL}={until}")?;
        }
        if let Some(count) = self.count {
            write!(f, ";{KW_RRULE_COUNT}={count}")?;
        }
        if self.interval != 1 {
            write!(f, ";{KW_RRULE_INTERVAL}={}", self.interval)?;
        }
        list(f, ByPart::BySecond.into(), &self.by_second)?;
        list(f, ByPart::ByMinute.into(), &self.by_minute)?;
        list(f, ByPart::ByHour.into(), &self.by_hour)?;
        list(f, ByPart::ByDay.into(), &self.by_day)?;
        list(f, ByPart::ByMonthDay.into(), &self.by_month_day)?;
        list(f, ByPart::ByYearDay.into(), &self.by_year_day)?;
        list(f, ByPart::ByWeekNo.into(), &self.by_week_no)?;
        list(f, ByPart::ByMonth.into(), &self.by_month)?;
        list(f, ByPart::BySetPos.into(), &self.by_set_pos)?;
        if self.wkst != WeekDay::Monday {
            write!(f, ";{KW_RRULE_WKST}={}", self.wkst)?;
        }
        Ok(())
    }
}

/// Builder for [`RecurrenceRule`]
///
/// Also the plain-data form a rule is deserialized from.
#[derive(Debug, Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct RecurrenceRuleBuilder {
    freq: Option<Frequency>,
    until: Option<CalendarTime>,
    count: Option<u32>,
    interval: Option<u32>,
    by_second: Vec<u8>,
    by_minute: Vec<u8>,
    by_hour: Vec<u8>,
    by_month_day: Vec<i8>,
    by_year_day: Vec<i16>,
    by_week_no: Vec<i8>,
    by_month: Vec<u8>,
    by_day: Vec<WeekDayNum>,
    by_set_pos: Vec<i16>,
    wkst: Option<WeekDay>,
}

impl RecurrenceRuleBuilder {
    /// Set FREQ.
    #[must_use]
    pub fn freq(mut self, freq: Frequency) -> Self {
        self.freq = Some(freq);
        self
    }

    /// Set UNTIL.
    #[must_use]
    pub fn until(mut self, until: CalendarTime) -> Self {
        self.until = Some(until);
        self
    }

    /// Set COUNT.
    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Set INTERVAL.
    #[must_use]
    pub fn interval(mut self, interval: u32) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Set BYSECOND.
    #[must_use]
    pub fn by_second(mut self, values: impl Into<Vec<u8>>) -> Self {
        self.by_second = values.into();
        self
    }

    /// Set BYMINUTE.
    #[must_use]
    pub fn by_minute(mut self, values: impl Into<Vec<u8>>) -> Self {
        self.by_minute = values.into();
        self
    }

    /// Set BYHOUR.
    #[must_use]
    pub fn by_hour(mut self, values: impl Into<Vec<u8>>) -> Self {
        self.by_hour = values.into();
        self
    }

    /// Set BYMONTHDAY.
    #[must_use]
    pub fn by_month_day(mut self, values: impl Into<Vec<i8>>) -> Self {
        self.by_month_day = values.into();
        self
    }

    /// Set BYYEARDAY.
    #[must_use]
    pub fn by_year_day(mut self, values: impl Into<Vec<i16>>) -> Self {
        self.by_year_day = values.into();
        self
    }

    /// Set BYWEEKNO.
    #[must_use]
    pub fn by_week_no(mut self, values: impl Into<Vec<i8>>) -> Self {
        self.by_week_no = values.into();
        self
    }

    /// Set BYMONTH.
    #[must_use]
    pub fn by_month(mut self, values: impl Into<Vec<u8>>) -> Self {
        self.by_month = values.into();
        self
    }

    /// Set BYDAY.
    #[must_use]
    pub fn by_day(mut self, values: impl Into<Vec<WeekDayNum>>) -> Self {
        self.by_day = values.into();
        self
    }

    /// Set BYSETPOS.
    #[must_use]
    pub fn by_set_pos(mut self, values: impl Into<Vec<i16>>) -> Self {
        self.by_set_pos = values.into();
        self
    }

    /// Set WKST.
    #[must_use]
    pub fn wkst(mut self, wkst: WeekDay) -> Self {
        self.wkst = Some(wkst);
        self
    }

    /// Set any part.
    #[must_use]
    pub fn part(self, part: RulePart) -> Self {
        match part {
            RulePart::Freq(v) => self.freq(v),
            RulePart::Until(v) => self.until(v),
            RulePart::Count(v) => self.count(v),
            RulePart::Interval(v) => self.interval(v),
            RulePart::BySecond(v) => self.by_second(v),
            RulePart::ByMinute(v) => self.by_minute(v),
            RulePart::ByHour(v) => self.by_hour(v),
            RulePart::ByMonthDay(v) => self.by_month_day(v),
            RulePart::ByYearDay(v) => self.by_year_day(v),
            RulePart::ByWeekNo(v) => self.by_week_no(v),
            RulePart::ByMonth(v) => self.by_month(v),
            RulePart::ByDay(v) => self.by_day(v),
            RulePart::BySetPos(v) => self.by_set_pos(v),
            RulePart::Wkst(v) => self.wkst(v),
        }
    }

    /// Validate and build the rule.
    ///
    /// # Errors
    ///
    /// Returns an error if FREQ is missing, UNTIL and COUNT are both set, a value is out of
    /// range, or parts that cannot be combined are present.
    pub fn build(self) -> Result<RecurrenceRule, RecurError> {
        let rule = RecurrenceRule {
            freq: self.freq.ok_or(RecurError::MissingFrequency)?,
            until: self.until,
            count: self.count,
            interval: self.interval.unwrap_or(1),
            by_second: self.by_second,
            by_minute: self.by_minute,
            by_hour: self.by_hour,
            by_month_day: self.by_month_day,
            by_year_day: self.by_year_day,
            by_week_no: self.by_week_no,
            by_month: self.by_month,
            by_day: self.by_day,
            by_set_pos: self.by_set_pos,
            wkst: self.wkst.unwrap_or(WeekDay::Monday),
        };
        rule.validate()?;
        Ok(rule)
    }
}

impl TryFrom<RecurrenceRuleBuilder> for RecurrenceRule {
    type Error = RecurError;

    fn try_from(value: RecurrenceRuleBuilder) -> Result<Self, Self::Error> {
        value.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rule_with_defaults() {
        let rule = RecurrenceRule::builder(Frequency::Daily).build().unwrap();
        assert_eq!(rule.freq(), Frequency::Daily);
        assert_eq!(rule.interval(), 1);
        assert_eq!(rule.week_start(), WeekDay::Monday);
        assert!(!rule.is_finite());
        assert!(!rule.is_by_count());
    }

    #[test]
    fn classifies_finite_rules() {
        let rule = RecurrenceRule::builder(Frequency::Daily).count(5).build().unwrap();
        assert!(rule.is_finite());
        assert!(rule.is_by_count());

        let rule = RecurrenceRule::builder(Frequency::Daily)
            .until(CalendarTime::date(2024, 1, 3))
            .build()
            .unwrap();
        assert!(rule.is_finite());
        assert!(!rule.is_by_count());
    }

    #[test]
    fn builds_rule_from_parts() {
        let rule = RecurrenceRule::from_parts([
            RulePart::Freq(Frequency::Monthly),
            RulePart::Count(3),
            RulePart::ByDay(vec![WeekDayNum::nth(-1, WeekDay::Friday)]),
        ])
        .unwrap();
        assert_eq!(rule.to_string(), "FREQ=MONTHLY;COUNT=3;BYDAY=-1FR");
        assert!(rule.has(ByPart::ByDay));
        assert!(!rule.has(ByPart::ByMonthDay));
    }

    #[test]
    fn rejects_duplicate_parts() {
        let result = RecurrenceRule::from_parts([
            RulePart::Freq(Frequency::Daily),
            RulePart::ByHour(vec![9]),
            RulePart::ByHour(vec![10]),
        ]);
        assert_eq!(result.unwrap_err(), RecurError::DuplicatePart { part: "BYHOUR" });
    }

    #[test]
    fn rejects_missing_freq() {
        let result = RecurrenceRule::from_parts([RulePart::Count(1)]);
        assert_eq!(result.unwrap_err(), RecurError::MissingFrequency);
    }

    #[test]
    fn rejects_count_with_until() {
        let result = RecurrenceRule::builder(Frequency::Daily)
            .count(2)
            .until(CalendarTime::date(2024, 1, 1))
            .build();
        assert_eq!(result.unwrap_err(), RecurError::CountAndUntil);
    }

    #[test]
    fn rejects_zero_interval_and_count() {
        let b = RecurrenceRule::builder(Frequency::Daily);
        assert_eq!(b.clone().interval(0).build().unwrap_err(), RecurError::ZeroInterval);
        assert_eq!(b.count(0).build().unwrap_err(), RecurError::ZeroCount);
    }

    #[test]
    fn rejects_out_of_range_values() {
        #[rustfmt::skip]
        let cases = [
            (RecurrenceRule::builder(Frequency::Daily).by_hour([24]), ByPart::ByHour, 24),
            (RecurrenceRule::builder(Frequency::Daily).by_minute([60]), ByPart::ByMinute, 60),
            (RecurrenceRule::builder(Frequency::Monthly).by_month_day([0]), ByPart::ByMonthDay, 0),
            (RecurrenceRule::builder(Frequency::Monthly).by_month_day([-32]), ByPart::ByMonthDay, -32),
            (RecurrenceRule::builder(Frequency::Yearly).by_month([13]), ByPart::ByMonth, 13),
            (RecurrenceRule::builder(Frequency::Yearly).by_week_no([54]), ByPart::ByWeekNo, 54),
            (RecurrenceRule::builder(Frequency::Yearly).by_year_day([367]), ByPart::ByYearDay, 367),
            (RecurrenceRule::builder(Frequency::Monthly).by_day([WeekDayNum::nth(6, WeekDay::Monday)]), ByPart::ByDay, 6),
        ];
        for (builder, part, value) in cases {
            assert_eq!(
                builder.build().unwrap_err(),
                RecurError::OutOfRange { part, value },
                "{part} {value}"
            );
        }
    }

    #[test]
    fn limits_weekday_ordinals_by_scope() {
        let nth = |n| [WeekDayNum::nth(n, WeekDay::Monday)];
        let yearly = || RecurrenceRule::builder(Frequency::Yearly);

        assert!(yearly().by_day(nth(53)).build().is_ok());
        assert!(yearly().by_day(nth(-53)).build().is_ok());
        assert!(yearly().by_month([3]).by_day(nth(5)).build().is_ok());
        assert_eq!(
            yearly().by_month([3]).by_day(nth(6)).build().unwrap_err(),
            RecurError::OutOfRange {
                part: ByPart::ByDay,
                value: 6
            }
        );
        assert_eq!(
            yearly().by_day(nth(54)).build().unwrap_err(),
            RecurError::OutOfRange {
                part: ByPart::ByDay,
                value: 54
            }
        );
    }

    #[test]
    fn rejects_incompatible_parts() {
        let cases = [
            RecurrenceRule::builder(Frequency::Yearly).by_year_day([1]).by_month([1]),
            RecurrenceRule::builder(Frequency::Yearly).by_week_no([1]).by_month_day([1]),
            RecurrenceRule::builder(Frequency::Monthly).by_week_no([1]),
            RecurrenceRule::builder(Frequency::Weekly).by_month_day([1]),
            RecurrenceRule::builder(Frequency::Daily).by_year_day([1]),
            RecurrenceRule::builder(Frequency::Weekly).by_day([WeekDayNum::nth(1, WeekDay::Monday)]),
        ];
        for builder in cases {
            let result = builder.clone().build();
            assert!(
                matches!(result, Err(RecurError::IncompatibleParts { .. })),
                "Should fail for {builder:?}"
            );
        }
    }

    #[test]
    fn parses_part_names() {
        assert_eq!("BYMONTHDAY".parse::<ByPart>().unwrap(), ByPart::ByMonthDay);
        assert_eq!("WEEKLY".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(ByPart::BySetPos.to_string(), "BYSETPOS");
    }

    #[test]
    fn deserializes_with_validation() {
        let rule: RecurrenceRule =
            serde_json::from_str(r#"{"freq":"WEEKLY","interval":2,"by_day":[{"day":"Monday","occurrence":null}]}"#)
                .unwrap();
        assert_eq!(rule.to_string(), "FREQ=WEEKLY;INTERVAL=2;BYDAY=MO");

        let json = serde_json::to_string(&rule).unwrap();
        let back: RecurrenceRule = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rule);

        let invalid = serde_json::from_str::<RecurrenceRule>(r#"{"freq":"DAILY","by_hour":[25]}"#);
        assert!(invalid.is_err());
    }
}

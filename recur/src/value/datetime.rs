// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Calendar time value with lazy normalization.
//!
//! A [`CalendarTime`] holds a civil date, an optional time of day and a [`Zone`]. Fields may be
//! written out of range (for example day 32 or hour -1); the value is then pending
//! normalization and every read observes the normalized form, carrying overflow into the larger
//! fields. Writes always apply to the stored fields, so callers that interleave reads and
//! out-of-range writes should [`CalendarTime::normalize`] in between.

use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::sync::OnceLock;

use crate::RecurError;
use crate::keyword::KW_UTC;
use crate::timezone::{Zone, registry};
use crate::value::calendar::{
    self, civil_from_days, days_from_civil, days_in_month, days_in_year,
};
use crate::value::{Duration, Period, WeekDay};

const SECONDS_PER_DAY: i64 = 86_400;

/// A field of a [`CalendarTime`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "lowercase")]
#[expect(missing_docs)]
pub enum TimeField {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
}

/// Raw civil fields, possibly out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct Parts {
    pub(crate) year: i32,
    pub(crate) month: i32,
    pub(crate) day: i32,
    pub(crate) hour: i32,
    pub(crate) minute: i32,
    pub(crate) second: i32,
}

impl Parts {
    pub(crate) const fn new(
        (year, month, day): (i32, i32, i32),
        (hour, minute, second): (i32, i32, i32),
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
        }
    }

    pub(crate) const fn get(&self, field: TimeField) -> i32 {
        match field {
            TimeField::Year => self.year,
            TimeField::Month => self.month,
            TimeField::Day => self.day,
            TimeField::Hour => self.hour,
            TimeField::Minute => self.minute,
            TimeField::Second => self.second,
        }
    }

    pub(crate) const fn set(&mut self, field: TimeField, value: i32) {
        match field {
            TimeField::Year => self.year = value,
            TimeField::Month => self.month = value,
            TimeField::Day => self.day = value,
            TimeField::Hour => self.hour = value,
            TimeField::Minute => self.minute = value,
            TimeField::Second => self.second = value,
        }
    }

    pub(crate) fn normalized(self, is_date: bool) -> Self {
        self.adjusted(0, 0, 0, 0, is_date)
    }

    /// Shift by the given amounts and carry every overflow into the larger fields.
    ///
    /// Date-only values ignore the time of day, which is forced to midnight.
    #[expect(clippy::cast_possible_truncation)]
    pub(crate) fn adjusted(
        self,
        days: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        is_date: bool,
    ) -> Self {
        let (mut hour, mut minute, mut second) = (0, 0, 0);
        let mut days_overflow = 0;
        if !is_date {
            let s = i64::from(self.second) + seconds;
            second = s.rem_euclid(60);
            let m = i64::from(self.minute) + minutes + s.div_euclid(60);
            minute = m.rem_euclid(60);
            let h = i64::from(self.hour) + hours + m.div_euclid(60);
            hour = h.rem_euclid(24);
            days_overflow = h.div_euclid(24);
        }

        let mut year = i64::from(self.year);
        let mut month = i64::from(self.month);
        let years_overflow = if month > 12 {
            (month - 1) / 12
        } else if month < 1 {
            month / 12 - 1
        } else {
            0
        };
        year += years_overflow;
        month -= 12 * years_overflow;

        let mut day = i64::from(self.day) + days + days_overflow;
        if day > 0 {
            loop {
                let dim = i64::from(days_in_month(month as i32, year as i32));
                if day <= dim {
                    break;
                }
                month += 1;
                if month > 12 {
                    year += 1;
                    month = 1;
                }
                day -= dim;
            }
        } else {
            while day <= 0 {
                if month == 1 {
                    year -= 1;
                    month = 12;
                } else {
                    month -= 1;
                }
                day += i64::from(days_in_month(month as i32, year as i32));
            }
        }

        Self::new(
            (year as i32, month as i32, day as i32),
            (hour as i32, minute as i32, second as i32),
        )
    }

    /// Seconds since the epoch, reading the fields as UTC.
    pub(crate) fn epoch_seconds(&self) -> i64 {
        days_from_civil(self.year, self.month, self.day) * SECONDS_PER_DAY
            + i64::from(self.hour) * 3600
            + i64::from(self.minute) * 60
            + i64::from(self.second)
    }

    #[expect(clippy::cast_possible_truncation)]
    pub(crate) fn from_epoch_seconds(seconds: i64) -> Self {
        let date = civil_from_days(seconds.div_euclid(SECONDS_PER_DAY));
        let secs = seconds.rem_euclid(SECONDS_PER_DAY) as i32;
        Self::new(date, (secs / 3600, secs / 60 % 60, secs % 60))
    }

    pub(crate) const fn date(&self) -> (i32, i32, i32) {
        (self.year, self.month, self.day)
    }
}

/// A civil date or date-time bound to a [`Zone`]
///
/// Equality and ordering compare the instant in time (see [`CalendarTime::to_unix_time`]), so a
/// date-time in New York and the same instant in UTC compare equal.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(into = "TimeData", try_from = "TimeData")]
pub struct CalendarTime {
    raw: Parts,
    is_date: bool,
    zone: Zone,
    pending: bool,
    unix_time: OnceLock<i64>,
}

impl CalendarTime {
    /// A floating date-only value; out-of-range fields are normalized.
    #[must_use]
    pub fn date(year: i32, month: i32, day: i32) -> Self {
        Self::from_parts(Parts::new((year, month, day), (0, 0, 0)), true, Zone::Floating)
    }

    /// A floating date-time value; out-of-range fields are normalized.
    #[must_use]
    pub fn datetime(year: i32, month: i32, day: i32, hour: i32, minute: i32, second: i32) -> Self {
        Self::from_parts(
            Parts::new((year, month, day), (hour, minute, second)),
            false,
            Zone::Floating,
        )
    }

    /// A floating date-only value from fields that must already be in range.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidDateTime`] naming the first out-of-range field.
    pub fn try_date(year: i32, month: i32, day: i32) -> Result<Self, RecurError> {
        let parts = Parts::new((year, month, day), (0, 0, 0));
        validate(&parts)?;
        Ok(Self::from_parts(parts, true, Zone::Floating))
    }

    /// A floating date-time value from fields that must already be in range.
    ///
    /// A second of 60 is accepted and carried into the next minute.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::InvalidDateTime`] naming the first out-of-range field.
    pub fn try_datetime(
        year: i32,
        month: i32,
        day: i32,
        hour: i32,
        minute: i32,
        second: i32,
    ) -> Result<Self, RecurError> {
        let parts = Parts::new((year, month, day), (hour, minute, second));
        validate(&parts)?;
        Ok(Self::from_parts(parts, false, Zone::Floating))
    }

    pub(crate) fn from_parts(raw: Parts, is_date: bool, zone: Zone) -> Self {
        Self {
            raw: raw.normalized(is_date),
            is_date,
            zone,
            pending: false,
            unix_time: OnceLock::new(),
        }
    }

    /// The UTC date-time of a unix timestamp.
    #[must_use]
    pub fn from_unix_time(seconds: i64) -> Self {
        Self::from_parts(Parts::from_epoch_seconds(seconds), false, Zone::Utc)
    }

    /// The current instant in UTC, truncated to the second.
    #[must_use]
    pub fn now() -> Self {
        Self::from_unix_time(jiff::Timestamp::now().as_second())
    }

    /// Attach `zone` without touching the wall-clock fields.
    #[must_use]
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self.invalidate();
        self
    }

    /// The UTC zone with the same wall-clock fields.
    #[must_use]
    pub fn utc(self) -> Self {
        self.with_zone(Zone::Utc)
    }

    pub(crate) fn parts(&self) -> Parts {
        if self.pending {
            self.raw.normalized(self.is_date)
        } else {
            self.raw
        }
    }

    /// Read a normalized field.
    #[must_use]
    pub fn get(&self, field: TimeField) -> i32 {
        self.parts().get(field)
    }

    /// Write a raw field; the value becomes pending normalization.
    pub fn set(&mut self, field: TimeField, value: i32) {
        self.raw.set(field, value);
        self.pending = true;
        self.invalidate();
    }

    /// Write the date fields at once.
    pub fn set_date(&mut self, year: i32, month: i32, day: i32) {
        self.raw.year = year;
        self.raw.month = month;
        self.raw.day = day;
        self.pending = true;
        self.invalidate();
    }

    /// Normalized year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.get(TimeField::Year)
    }

    /// Normalized month, from 1 to 12.
    #[must_use]
    pub fn month(&self) -> i32 {
        self.get(TimeField::Month)
    }

    /// Normalized day of month.
    #[must_use]
    pub fn day(&self) -> i32 {
        self.get(TimeField::Day)
    }

    /// Normalized hour; always 0 for date-only values.
    #[must_use]
    pub fn hour(&self) -> i32 {
        self.get(TimeField::Hour)
    }

    /// Normalized minute; always 0 for date-only values.
    #[must_use]
    pub fn minute(&self) -> i32 {
        self.get(TimeField::Minute)
    }

    /// Normalized second; always 0 for date-only values.
    #[must_use]
    pub fn second(&self) -> i32 {
        self.get(TimeField::Second)
    }

    /// Whether the value is a date without a time of day.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        self.is_date
    }

    /// Switch between date-only and date-time; becoming date-only drops the time of day.
    pub fn set_is_date(&mut self, is_date: bool) {
        self.normalize();
        self.is_date = is_date;
        if is_date {
            self.raw.hour = 0;
            self.raw.minute = 0;
            self.raw.second = 0;
        }
        self.invalidate();
    }

    /// The zone of the wall-clock fields.
    #[must_use]
    pub const fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Whether the stored fields are known to be in range.
    #[must_use]
    pub const fn is_normalized(&self) -> bool {
        !self.pending
    }

    /// Carry all out-of-range fields into the larger ones.
    pub fn normalize(&mut self) {
        if self.pending {
            self.raw = self.raw.normalized(self.is_date);
            self.pending = false;
        }
    }

    /// Shift by whole days, hours, minutes and seconds, normalizing the result.
    pub fn adjust(&mut self, days: i64, hours: i64, minutes: i64, seconds: i64) {
        self.raw = self
            .parts()
            .adjusted(days, hours, minutes, seconds, self.is_date);
        self.pending = false;
        self.invalidate();
    }

    /// Add a signed [`Duration`]; date-only values ignore its time part.
    pub fn add_duration(&mut self, duration: &Duration) {
        let sign = if duration.is_negative { -1 } else { 1 };
        let days = u128::from(duration.weeks) * 7 + u128::from(duration.days);
        self.adjust(
            sign * i64::try_from(days).unwrap_or(i64::MAX),
            sign * i64::from(duration.hours),
            sign * i64::from(duration.minutes),
            sign * i64::from(duration.seconds),
        );
    }

    /// Difference of the wall-clock readings, ignoring both zones.
    #[must_use]
    pub fn subtract_date(&self, other: &CalendarTime) -> Duration {
        let this = self.to_unix_time() + i64::from(self.utc_offset());
        let that = other.to_unix_time() + i64::from(other.utc_offset());
        Duration::from_seconds(this - that)
    }

    /// Difference of the instants in time.
    #[must_use]
    pub fn subtract_date_tz(&self, other: &CalendarTime) -> Duration {
        Duration::from_seconds(self.to_unix_time() - other.to_unix_time())
    }

    /// Offset from UTC in seconds of the wall-clock reading in its zone.
    #[must_use]
    pub fn utc_offset(&self) -> i32 {
        self.zone.utc_offset(&self.parts())
    }

    /// Seconds since 1970-01-01T00:00:00Z; floating values are read as UTC.
    #[must_use]
    pub fn to_unix_time(&self) -> i64 {
        *self
            .unix_time
            .get_or_init(|| self.parts().epoch_seconds() - i64::from(self.utc_offset()))
    }

    /// The same instant expressed in another zone.
    ///
    /// Conversions to or from a floating zone, and conversions of date-only values, keep the
    /// wall-clock fields unchanged.
    #[must_use]
    pub fn convert_to_zone(&self, zone: &Zone) -> CalendarTime {
        let mut copy = self.clone();
        copy.normalize();
        if self.zone == *zone || self.zone.is_floating() || zone.is_floating() || self.is_date {
            return copy.with_zone(zone.clone());
        }

        // Offsets are looked up by wall-clock time: probe with the UTC reading first, then
        // settle on the offset in force at the resulting local time.
        let instant = self.to_unix_time();
        let guess = zone.utc_offset(&Parts::from_epoch_seconds(instant));
        let local = Parts::from_epoch_seconds(instant + i64::from(guess));
        let offset = zone.utc_offset(&local);
        copy.raw = Parts::from_epoch_seconds(instant + i64::from(offset));
        copy.with_zone(zone.clone())
    }

    /// Compare the calendar dates of both values after converting them into `zone`.
    #[must_use]
    pub fn compare_date_only_tz(&self, other: &CalendarTime, zone: &Zone) -> Ordering {
        let a = self.convert_to_zone(zone).parts().date();
        let b = other.convert_to_zone(zone).parts().date();
        a.cmp(&b)
    }

    /// Compare the calendar dates of both values in their own zones.
    #[must_use]
    pub fn compare_date_only(&self, other: &CalendarTime) -> Ordering {
        self.parts().date().cmp(&other.parts().date())
    }

    /// Position relative to a period: `Less` before its start, `Greater` after its end,
    /// `Equal` within it.
    #[must_use]
    pub fn cmp_period(&self, period: &Period) -> Ordering {
        if *self < period.start() {
            Ordering::Less
        } else if *self > period.end() {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Position within a week starting on `week_start`, from 1 to 7.
    #[must_use]
    pub fn day_of_week(&self, week_start: WeekDay) -> u8 {
        let (y, m, d) = self.parts().date();
        calendar::day_of_week(y, m, d, week_start)
    }

    /// Weekday of the date.
    #[must_use]
    pub fn weekday(&self) -> WeekDay {
        let (y, m, d) = self.parts().date();
        calendar::weekday(y, m, d)
    }

    /// Day of year, from 1.
    #[must_use]
    pub fn day_of_year(&self) -> i32 {
        let (y, m, d) = self.parts().date();
        calendar::day_of_year(y, m, d)
    }

    /// Week number for weeks starting on `week_start`.
    #[must_use]
    pub fn week_number(&self, week_start: WeekDay) -> i32 {
        let (y, m, d) = self.parts().date();
        calendar::week_number(y, m, d, week_start)
    }

    /// Day of year of the first day of this week; may be 0 or negative early in January.
    #[must_use]
    pub fn start_doy_week(&self, week_start: WeekDay) -> i32 {
        let delta = i32::from(self.day_of_week(week_start)) - 1;
        self.day_of_year() - delta
    }

    /// See [`calendar::nth_weekday`].
    #[must_use]
    pub fn nth_weekday(&self, weekday: WeekDay, pos: i32) -> i32 {
        let (y, m, _) = self.parts().date();
        calendar::nth_weekday(y, m, weekday, pos)
    }

    /// See [`calendar::is_nth_weekday`].
    #[must_use]
    pub fn is_nth_weekday(&self, weekday: WeekDay, pos: i32) -> bool {
        let (y, m, d) = self.parts().date();
        calendar::is_nth_weekday(y, m, d, weekday, pos)
    }

    /// First day of the week, as a date.
    #[must_use]
    pub fn start_of_week(&self, week_start: WeekDay) -> CalendarTime {
        let offset = i64::from(self.day_of_week(week_start)) - 1;
        self.as_date_shifted(-offset)
    }

    /// Last day of the week, as a date.
    #[must_use]
    pub fn end_of_week(&self, week_start: WeekDay) -> CalendarTime {
        let offset = 7 - i64::from(self.day_of_week(week_start));
        self.as_date_shifted(offset)
    }

    /// First day of the month, as a date.
    #[must_use]
    pub fn start_of_month(&self) -> CalendarTime {
        let (y, m, _) = self.parts().date();
        self.as_date(y, m, 1)
    }

    /// Last day of the month, as a date.
    #[must_use]
    pub fn end_of_month(&self) -> CalendarTime {
        let (y, m, _) = self.parts().date();
        self.as_date(y, m, days_in_month(m, y))
    }

    /// First day of the year, as a date.
    #[must_use]
    pub fn start_of_year(&self) -> CalendarTime {
        self.as_date(self.year(), 1, 1)
    }

    /// Last day of the year, as a date.
    #[must_use]
    pub fn end_of_year(&self) -> CalendarTime {
        let year = self.year();
        let (y, m, d) = calendar::from_day_of_year(days_in_year(year), year);
        self.as_date(y, m, d)
    }

    fn as_date(&self, year: i32, month: i32, day: i32) -> CalendarTime {
        Self::from_parts(
            Parts::new((year, month, day), (0, 0, 0)),
            true,
            self.zone.clone(),
        )
    }

    fn as_date_shifted(&self, days: i64) -> CalendarTime {
        let (y, m, d) = self.parts().date();
        let mut date = self.as_date(y, m, d);
        date.adjust(days, 0, 0, 0);
        date
    }

    fn invalidate(&mut self) {
        self.unix_time = OnceLock::new();
    }
}

fn validate(parts: &Parts) -> Result<(), RecurError> {
    let checks = [
        (TimeField::Month, 1..=12),
        (TimeField::Day, 1..=days_in_month(parts.month, parts.year)),
        (TimeField::Hour, 0..=23),
        (TimeField::Minute, 0..=59),
        (TimeField::Second, 0..=60),
    ];
    for (field, range) in checks {
        let value = parts.get(field);
        if !range.contains(&value) {
            return Err(RecurError::InvalidDateTime { field, value });
        }
    }
    Ok(())
}

impl PartialEq for CalendarTime {
    fn eq(&self, other: &Self) -> bool {
        self.to_unix_time() == other.to_unix_time()
    }
}

impl Eq for CalendarTime {}

impl PartialOrd for CalendarTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CalendarTime {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_unix_time().cmp(&other.to_unix_time())
    }
}

impl Display for CalendarTime {
    /// RFC 5545 basic format, e.g. `20240101` or `20240101T090000Z`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = self.parts();
        write!(f, "{:04}{:02}{:02}", p.year, p.month, p.day)?;
        if !self.is_date {
            write!(f, "T{:02}{:02}{:02}", p.hour, p.minute, p.second)?;
            if self.zone.is_utc() {
                write!(f, "Z")?;
            }
        }
        Ok(())
    }
}

/// Plain-data form of a [`CalendarTime`], used for serialization
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TimeData {
    /// Year
    pub year: i32,
    /// Month, from 1 to 12
    pub month: i32,
    /// Day of month
    pub day: i32,
    /// Hour
    #[serde(default)]
    pub hour: i32,
    /// Minute
    #[serde(default)]
    pub minute: i32,
    /// Second
    #[serde(default)]
    pub second: i32,
    /// Whether the value is date-only
    #[serde(default)]
    pub is_date: bool,
    /// Zone identifier; absent for floating values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tzid: Option<String>,
}

impl From<CalendarTime> for TimeData {
    fn from(value: CalendarTime) -> Self {
        let p = value.parts();
        Self {
            year: p.year,
            month: p.month,
            day: p.day,
            hour: p.hour,
            minute: p.minute,
            second: p.second,
            is_date: value.is_date,
            tzid: value.zone.tzid().map(ToOwned::to_owned),
        }
    }
}

impl TryFrom<TimeData> for CalendarTime {
    type Error = RecurError;

    /// Rebuild a value, resolving the tzid through the timezone registry.
    ///
    /// Unknown tzids degrade to floating.
    fn try_from(value: TimeData) -> Result<Self, Self::Error> {
        let parts = Parts::new(
            (value.year, value.month, value.day),
            (value.hour, value.minute, value.second),
        );
        validate(&parts)?;

        let zone = match value.tzid.as_deref() {
            None => Zone::Floating,
            Some(KW_UTC) => Zone::Utc,
            Some(tzid) => match registry::get(tzid) {
                Some(tz) => Zone::Tz(tz),
                None => {
                    tracing::warn!(tzid, "unknown timezone, treating time as floating");
                    Zone::Floating
                }
            },
        };
        Ok(Self::from_parts(parts, value.is_date, zone))
    }
}

impl From<jiff::civil::Date> for CalendarTime {
    fn from(value: jiff::civil::Date) -> Self {
        Self::date(
            i32::from(value.year()),
            i32::from(value.month()),
            i32::from(value.day()),
        )
    }
}

impl From<jiff::civil::DateTime> for CalendarTime {
    fn from(value: jiff::civil::DateTime) -> Self {
        Self::datetime(
            i32::from(value.year()),
            i32::from(value.month()),
            i32::from(value.day()),
            i32::from(value.hour()),
            i32::from(value.minute()),
            i32::from(value.second()),
        )
    }
}

impl From<jiff::Timestamp> for CalendarTime {
    fn from(value: jiff::Timestamp) -> Self {
        Self::from_unix_time(value.as_second())
    }
}

impl TryFrom<&CalendarTime> for jiff::civil::DateTime {
    type Error = RecurError;

    /// Wall-clock fields only; the zone is dropped.
    fn try_from(value: &CalendarTime) -> Result<Self, Self::Error> {
        let p = value.parts();
        let narrow = |field: TimeField| {
            let v = p.get(field);
            i8::try_from(v).map_err(|_| RecurError::InvalidDateTime { field, value: v })
        };
        let year = i16::try_from(p.year).map_err(|_| RecurError::InvalidDateTime {
            field: TimeField::Year,
            value: p.year,
        })?;
        jiff::civil::DateTime::new(
            year,
            narrow(TimeField::Month)?,
            narrow(TimeField::Day)?,
            narrow(TimeField::Hour)?,
            narrow(TimeField::Minute)?,
            narrow(TimeField::Second)?.min(59),
            0,
        )
        .map_err(|_| RecurError::InvalidDateTime {
            field: TimeField::Year,
            value: p.year,
        })
    }
}

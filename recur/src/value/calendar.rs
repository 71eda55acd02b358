// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Pure calendar arithmetic used by times, rules and timezone tables.
//!
//! Months are 1-based and days-of-year are 1-based. Leap years follow the Julian rule up to and
//! including 1752 and the Gregorian rule afterwards, while weekdays and epoch day numbers use the
//! proleptic Gregorian calendar throughout.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{OnceLock, RwLock};

use crate::value::WeekDay;

/// Cumulative days before each month, for common and leap years.
#[rustfmt::skip]
const DAYS_BEFORE_MONTH: [[i32; 13]; 2] = [
    [0, 31, 59, 90, 120, 151, 181, 212, 243, 273, 304, 334, 365],
    [0, 31, 60, 91, 121, 152, 182, 213, 244, 274, 305, 335, 366],
];

#[rustfmt::skip]
const DAYS_IN_MONTH: [i32; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

/// Entries kept per memo table before it is flushed.
const CACHE_CAPACITY: usize = 1 << 16;

/// Whether `year` has 366 days.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    if year <= 1752 {
        year % 4 == 0
    } else {
        (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
    }
}

/// Number of days in `year`.
#[must_use]
pub const fn days_in_year(year: i32) -> i32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Number of days in `month` of `year`, or 30 for a month outside 1..=12.
#[must_use]
pub fn days_in_month(month: i32, year: i32) -> i32 {
    match month {
        2 if is_leap_year(year) => 29,
        1..=12 => usize::try_from(month)
            .ok()
            .and_then(|m| DAYS_IN_MONTH.get(m).copied())
            .unwrap_or(30),
        _ => 30,
    }
}

/// Days of `year` elapsed before the first of `month`.
#[must_use]
pub fn days_before_month(month: i32, year: i32) -> i32 {
    let [common, leap] = &DAYS_BEFORE_MONTH;
    let table = if is_leap_year(year) { leap } else { common };
    usize::try_from(month - 1)
        .ok()
        .and_then(|m| table.get(m).copied())
        .unwrap_or(0)
}

/// Day of year of a valid date.
#[must_use]
pub fn day_of_year(year: i32, month: i32, day: i32) -> i32 {
    days_before_month(month, year) + day
}

/// Date of the `day_of_year`-th day of `year`; values outside of the year roll into the
/// neighbouring years.
#[must_use]
pub fn from_day_of_year(day_of_year: i32, year: i32) -> (i32, i32, i32) {
    let mut year = year;
    let mut doy = day_of_year;
    loop {
        if doy < 1 {
            year -= 1;
            doy += days_in_year(year);
        } else if doy > days_in_year(year) {
            doy -= days_in_year(year);
            year += 1;
        } else {
            break;
        }
    }

    let mut month = 1;
    while month < 12 && days_before_month(month + 1, year) < doy {
        month += 1;
    }
    (year, month, doy - days_before_month(month, year))
}

/// Days since 1970-01-01 in the proleptic Gregorian calendar.
#[must_use]
pub fn days_from_civil(year: i32, month: i32, day: i32) -> i64 {
    let y = i64::from(year) - i64::from(month <= 2);
    let era = y.div_euclid(400);
    let yoe = y - era * 400;
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

/// Inverse of [`days_from_civil`].
#[must_use]
#[expect(clippy::cast_possible_truncation)]
pub fn civil_from_days(days: i64) -> (i32, i32, i32) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = doy - (153 * mp + 2) / 5 + 1;
    let month = if mp < 10 { mp + 3 } else { mp - 9 };
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year as i32, month as i32, day as i32)
}

/// Position of a date within a week starting on `week_start`, from 1 to 7.
#[must_use]
pub fn day_of_week(year: i32, month: i32, day: i32, week_start: WeekDay) -> u8 {
    CalendarCache::global().day_of_week(year, month, day, week_start)
}

/// Weekday of a date.
#[must_use]
pub fn weekday(year: i32, month: i32, day: i32) -> WeekDay {
    WeekDay::from_number(i32::from(day_of_week(year, month, day, WeekDay::Sunday)))
}

/// Week number of a date for weeks beginning on `week_start`.
///
/// Week 1 is the first week holding at least four days of the year, so days in late December may
/// belong to week 1 of the following year and days in early January to the last week of the
/// previous year.
#[must_use]
pub fn week_number(year: i32, month: i32, day: i32, week_start: WeekDay) -> i32 {
    CalendarCache::global().week_number(year, month, day, week_start)
}

/// Epoch day on which week 1 of `year` begins.
#[must_use]
pub fn week_one_starts(year: i32, week_start: WeekDay) -> i64 {
    let dow = i32::from(day_of_week(year, 1, 1, WeekDay::Sunday));
    let thursday = i32::from(WeekDay::Thursday.number());
    let wkst = i32::from(week_start.number());

    let mut day = 1;
    if dow > thursday {
        day += 7;
    }
    if wkst > thursday {
        day -= 7;
    }
    day -= dow - wkst;
    days_from_civil(year, 1, 1) + i64::from(day - 1)
}

/// Day of month of the `pos`-th `weekday` in `month`, counted from the end when negative and
/// meaning the first one when zero. The result may fall outside of the month.
#[must_use]
pub fn nth_weekday(year: i32, month: i32, weekday: WeekDay, pos: i32) -> i32 {
    let target = i32::from(weekday.number());
    if pos >= 0 {
        let first = i32::from(day_of_week(year, month, 1, WeekDay::Sunday));
        let day = 1 + (target - first).rem_euclid(7);
        day + (pos.max(1) - 1) * 7
    } else {
        let last_day = days_in_month(month, year);
        let last = i32::from(day_of_week(year, month, last_day, WeekDay::Sunday));
        let day = last_day - (last - target).rem_euclid(7);
        day + (pos + 1) * 7
    }
}

/// Whether a date is the `pos`-th `weekday` of its month; a zero `pos` matches every one.
#[must_use]
pub fn is_nth_weekday(year: i32, month: i32, day: i32, weekday: WeekDay, pos: i32) -> bool {
    if pos == 0 {
        self::weekday(year, month, day) == weekday
    } else {
        nth_weekday(year, month, weekday, pos) == day
    }
}

type DayKey = (i32, i32, i32, WeekDay);

/// Memo tables for weekday and week-number computations.
///
/// A process-wide instance is reachable through [`CalendarCache::global`]; population is
/// synchronized, so the tables may be shared between threads.
#[derive(Debug, Default)]
pub struct CalendarCache {
    weekdays: RwLock<HashMap<DayKey, u8>>,
    week_numbers: RwLock<HashMap<DayKey, i32>>,
}

impl CalendarCache {
    /// The process-wide cache.
    pub fn global() -> &'static CalendarCache {
        static CACHE: OnceLock<CalendarCache> = OnceLock::new();
        CACHE.get_or_init(CalendarCache::default)
    }

    /// Memoized [`day_of_week`].
    pub fn day_of_week(&self, year: i32, month: i32, day: i32, week_start: WeekDay) -> u8 {
        memoize(&self.weekdays, (year, month, day, week_start), || {
            compute_day_of_week(year, month, day, week_start)
        })
    }

    /// Memoized [`week_number`].
    pub fn week_number(&self, year: i32, month: i32, day: i32, week_start: WeekDay) -> i32 {
        memoize(&self.week_numbers, (year, month, day, week_start), || {
            compute_week_number(year, month, day, week_start)
        })
    }

    /// Drop every memoized entry.
    pub fn clear(&self) {
        if let Ok(mut map) = self.weekdays.write() {
            map.clear();
        }
        if let Ok(mut map) = self.week_numbers.write() {
            map.clear();
        }
    }
}

fn memoize<K, V, F>(table: &RwLock<HashMap<K, V>>, key: K, compute: F) -> V
where
    K: Eq + Hash,
    V: Copy,
    F: FnOnce() -> V,
{
    if let Some(value) = table.read().ok().and_then(|map| map.get(&key).copied()) {
        return value;
    }

    let value = compute();
    if let Ok(mut map) = table.write() {
        if map.len() >= CACHE_CAPACITY {
            map.clear();
        }
        map.insert(key, value);
    }
    value
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn compute_day_of_week(year: i32, month: i32, day: i32, week_start: WeekDay) -> u8 {
    let (m, y) = if month < 3 {
        (i64::from(month) + 12, i64::from(year) - 1)
    } else {
        (i64::from(month), i64::from(year))
    };

    let h = i64::from(day)
        + y
        + ((m + 1) * 26).div_euclid(10)
        + y.div_euclid(4)
        + 6 * y.div_euclid(100)
        + y.div_euclid(400);

    // h is 0 on a Saturday; shift so that `week_start` becomes 1
    ((h + 7 - i64::from(week_start.number())).rem_euclid(7) + 1) as u8
}

#[expect(clippy::cast_possible_truncation)]
fn compute_week_number(year: i32, month: i32, day: i32, week_start: WeekDay) -> i32 {
    let date = days_from_civil(year, month, day);

    let week_one = if month == 12 && day > 25 {
        let next = week_one_starts(year + 1, week_start);
        if date < next {
            week_one_starts(year, week_start)
        } else {
            next
        }
    } else {
        let current = week_one_starts(year, week_start);
        if date < current {
            week_one_starts(year - 1, week_start)
        } else {
            current
        }
    };

    ((date - week_one).div_euclid(7) + 1) as i32
}

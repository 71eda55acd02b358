// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Weekdays and the ordinal weekday designators of BYDAY.

use std::fmt::{self, Display};
use std::str::FromStr;

use crate::RecurError;
use crate::keyword::{KW_DAY_FR, KW_DAY_MO, KW_DAY_SA, KW_DAY_SU, KW_DAY_TH, KW_DAY_TU, KW_DAY_WE};

/// Day of the week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[expect(missing_docs)]
pub enum WeekDay {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl WeekDay {
    /// All weekdays, starting with Sunday.
    pub const ALL: [WeekDay; 7] = [
        WeekDay::Sunday,
        WeekDay::Monday,
        WeekDay::Tuesday,
        WeekDay::Wednesday,
        WeekDay::Thursday,
        WeekDay::Friday,
        WeekDay::Saturday,
    ];

    /// Day number with Sunday as 1 and Saturday as 7.
    #[must_use]
    pub const fn number(self) -> u8 {
        self as u8 + 1
    }

    /// Inverse of [`WeekDay::number`], wrapping any integer into the week.
    #[must_use]
    pub fn from_number(number: i32) -> Self {
        match (number - 1).rem_euclid(7) {
            0 => WeekDay::Sunday,
            1 => WeekDay::Monday,
            2 => WeekDay::Tuesday,
            3 => WeekDay::Wednesday,
            4 => WeekDay::Thursday,
            5 => WeekDay::Friday,
            _ => WeekDay::Saturday,
        }
    }

    /// Position of this day in a week beginning on `week_start`, from 1 to 7.
    #[must_use]
    pub const fn position_from(self, week_start: WeekDay) -> u8 {
        (self.number() + 7 - week_start.number()) % 7 + 1
    }
}

impl Display for WeekDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeekDay::Sunday => write!(f, "{KW_DAY_SU}"),
            WeekDay::Monday => write!(f, "{KW_DAY_MO}"),
            WeekDay::Tuesday => write!(f, "{KW_DAY_TU}"),
            WeekDay::Wednesday => write!(f, "{KW_DAY_WE}"),
            WeekDay::Thursday => write!(f, "{KW_DAY_TH}"),
            WeekDay::Friday => write!(f, "{KW_DAY_FR}"),
            WeekDay::Saturday => write!(f, "{KW_DAY_SA}"),
        }
    }
}

impl FromStr for WeekDay {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            KW_DAY_SU => Ok(WeekDay::Sunday),
            KW_DAY_MO => Ok(WeekDay::Monday),
            KW_DAY_TU => Ok(WeekDay::Tuesday),
            KW_DAY_WE => Ok(WeekDay::Wednesday),
            KW_DAY_TH => Ok(WeekDay::Thursday),
            KW_DAY_FR => Ok(WeekDay::Friday),
            KW_DAY_SA => Ok(WeekDay::Saturday),
            _ => Err(RecurError::InvalidWeekDay(s.to_owned())),
        }
    }
}

impl From<jiff::civil::Weekday> for WeekDay {
    fn from(value: jiff::civil::Weekday) -> Self {
        Self::from_number(i32::from(value.to_sunday_one_offset()))
    }
}

/// Day of week with optional occurrence, e.g. `-1SU` for the last Sunday
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
pub struct WeekDayNum {
    /// Day of the week
    pub day: WeekDay,
    /// Occurrence within the month or year, counted from the end when negative
    pub occurrence: Option<i8>,
}

impl WeekDayNum {
    /// Every occurrence of `day`.
    #[must_use]
    pub const fn every(day: WeekDay) -> Self {
        Self {
            day,
            occurrence: None,
        }
    }

    /// The `occurrence`-th `day` of the period.
    #[must_use]
    pub const fn nth(occurrence: i8, day: WeekDay) -> Self {
        Self {
            day,
            occurrence: Some(occurrence),
        }
    }

    /// Occurrence as used by the calendar math, where 0 means "every".
    #[must_use]
    pub fn position(self) -> i32 {
        self.occurrence.map_or(0, i32::from)
    }
}

impl From<WeekDay> for WeekDayNum {
    fn from(day: WeekDay) -> Self {
        Self::every(day)
    }
}

impl Display for WeekDayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.occurrence {
            Some(n) => write!(f, "{n}{}", self.day),
            None => write!(f, "{}", self.day),
        }
    }
}

impl FromStr for WeekDayNum {
    type Err = RecurError;

    /// Parse a designator such as `MO`, `2TU` or `-1SU`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.len().saturating_sub(2);
        let (ordinal, day) = match (s.get(..split), s.get(split..)) {
            (Some(ordinal), Some(day)) => (ordinal, day),
            _ => return Err(RecurError::InvalidWeekDay(s.to_owned())),
        };
        let day = day.parse::<WeekDay>()?;
        let occurrence = match ordinal {
            "" => None,
            _ => match ordinal.trim_start_matches('+').parse::<i8>() {
                Ok(0) | Err(_) => return Err(RecurError::InvalidWeekDay(s.to_owned())),
                Ok(n) => Some(n),
            },
        };
        Ok(Self { day, occurrence })
    }
}

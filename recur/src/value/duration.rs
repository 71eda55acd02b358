// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Signed durations as defined in RFC 5545 Section 3.3.6.

use std::cmp::Ordering;
use std::fmt::{self, Display};

/// Duration Value defined in RFC 5545 Section 3.3.6
///
/// Two durations are equal when they span the same number of seconds, so `P1W` equals `P7D`.
#[derive(Debug, Clone, Copy, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Duration {
    /// Week Duration
    pub weeks: u64,
    /// Day Duration
    pub days: u64,
    /// Hour Duration
    pub hours: u32,
    /// Minute Duration
    pub minutes: u32,
    /// Second Duration
    pub seconds: u32,
    /// Whether the duration points backwards in time
    pub is_negative: bool,
}

impl Duration {
    /// Decompose a signed number of seconds.
    ///
    /// Whole weeks are used only when the day count is a multiple of seven. Every `i64` value
    /// survives a round trip through [`Duration::to_seconds`].
    #[must_use]
    pub fn from_seconds(seconds: i64) -> Self {
        let total = seconds.unsigned_abs();
        // below one day, so always in range
        let narrow = |v: u64| u32::try_from(v).unwrap_or(u32::MAX);

        let days = total / 86_400;
        let (weeks, days) = if days % 7 == 0 {
            (days / 7, 0)
        } else {
            (0, days)
        };
        let rest = total % 86_400;

        Self {
            weeks,
            days,
            hours: narrow(rest / 3600),
            minutes: narrow(rest % 3600 / 60),
            seconds: narrow(rest % 60),
            is_negative: seconds < 0,
        }
    }

    /// Signed total number of seconds, saturating at the `i64` bounds.
    #[must_use]
    pub fn to_seconds(&self) -> i64 {
        let seconds = i128::from(self.seconds)
            + 60 * i128::from(self.minutes)
            + 3600 * i128::from(self.hours)
            + 86_400 * i128::from(self.days)
            + 604_800 * i128::from(self.weeks);
        let seconds = if self.is_negative { -seconds } else { seconds };
        i64::try_from(seconds).unwrap_or(if seconds < 0 { i64::MIN } else { i64::MAX })
    }

    /// Re-decompose the fields so that each is within its natural range.
    pub fn normalize(&mut self) {
        *self = Self::from_seconds(self.to_seconds());
    }
}

impl PartialEq for Duration {
    fn eq(&self, other: &Self) -> bool {
        self.to_seconds() == other.to_seconds()
    }
}

impl Eq for Duration {}

impl PartialOrd for Duration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Duration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_seconds().cmp(&other.to_seconds())
    }
}

impl Display for Duration {
    /// Format as `dur-value`, e.g. `-P1W` or `P2DT3H`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.to_seconds() == 0 {
            return write!(f, "PT0S");
        }

        if self.is_negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;

        let has_time = self.hours != 0 || self.minutes != 0 || self.seconds != 0;
        if self.weeks != 0 && self.days == 0 && !has_time {
            return write!(f, "{}W", self.weeks);
        }

        let days = u128::from(self.weeks) * 7 + u128::from(self.days);
        if days != 0 {
            write!(f, "{days}D")?;
        }
        if has_time {
            write!(f, "T")?;
            if self.hours != 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes != 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds != 0 {
                write!(f, "{}S", self.seconds)?;
            }
        }
        Ok(())
    }
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::{self, Display};

use crate::value::{CalendarTime, RecurrenceRule};

/// Declarative timezone definition, mirroring a VTIMEZONE component
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimezoneDefinition {
    /// Timezone identifier
    pub tz_id: String,

    /// Standard time observances
    #[serde(default)]
    pub standard: Vec<Observance>,

    /// Daylight saving time observances
    #[serde(default)]
    pub daylight: Vec<Observance>,
}

impl TimezoneDefinition {
    /// A definition without observances, which resolves every time to offset zero.
    #[must_use]
    pub fn new(tz_id: impl Into<String>) -> Self {
        Self {
            tz_id: tz_id.into(),
            standard: Vec::new(),
            daylight: Vec::new(),
        }
    }

    /// Add a STANDARD observance.
    #[must_use]
    pub fn with_standard(mut self, observance: Observance) -> Self {
        self.standard.push(observance);
        self
    }

    /// Add a DAYLIGHT observance.
    #[must_use]
    pub fn with_daylight(mut self, observance: Observance) -> Self {
        self.daylight.push(observance);
        self
    }
}

/// A STANDARD or DAYLIGHT sub-component
///
/// `dtstart` is the local wall-clock time of the first onset, expressed in `offset_from`. Without
/// `rrule` and `rdates` the observance has a single onset.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Observance {
    /// First onset, in local time before the transition
    pub dtstart: CalendarTime,

    /// Offset in force before the onset
    pub offset_from: UtcOffset,

    /// Offset in force after the onset
    pub offset_to: UtcOffset,

    /// Recurrence of the onset
    #[serde(default)]
    pub rrule: Option<RecurrenceRule>,

    /// Additional onsets; local unless UTC
    #[serde(default)]
    pub rdates: Vec<CalendarTime>,

    /// Customary names, e.g. `EST`
    #[serde(default)]
    pub names: Vec<String>,
}

impl Observance {
    /// A single onset at `dtstart`.
    #[must_use]
    pub fn new(dtstart: CalendarTime, offset_from: UtcOffset, offset_to: UtcOffset) -> Self {
        Self {
            dtstart,
            offset_from,
            offset_to,
            rrule: None,
            rdates: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Recur the onset by `rrule`.
    #[must_use]
    pub fn with_rrule(mut self, rrule: RecurrenceRule) -> Self {
        self.rrule = Some(rrule);
        self
    }

    /// Add an explicit onset.
    #[must_use]
    pub fn with_rdate(mut self, rdate: CalendarTime) -> Self {
        self.rdates.push(rdate);
        self
    }

    /// Add a customary name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }
}

/// UTC offset in seconds, east of Greenwich positive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct UtcOffset(i32);

impl UtcOffset {
    /// Offset from hours and minutes; a negative `hours` makes the whole offset negative.
    #[must_use]
    pub const fn hm(hours: i32, minutes: i32) -> Self {
        let seconds = hours.abs() * 3600 + minutes * 60;
        Self(if hours < 0 { -seconds } else { seconds })
    }

    /// Offset from a signed number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: i32) -> Self {
        Self(seconds)
    }

    /// Signed number of seconds.
    #[must_use]
    pub const fn as_seconds(self) -> i32 {
        self.0
    }
}

impl Display for UtcOffset {
    /// Format as `utc-offset`, e.g. `-0500` or `+053045`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { '-' } else { '+' };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{:02}{:02}", abs / 3600, abs / 60 % 60)?;
        if abs % 60 != 0 {
            write!(f, "{:02}", abs % 60)?;
        }
        Ok(())
    }
}

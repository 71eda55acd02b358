// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Period of time as defined in RFC 5545 Section 3.3.9.

use crate::value::{CalendarTime, Duration};

/// Period of Time Value defined in RFC 5545 Section 3.3.9
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Period {
    /// Period with explicit start and end times
    Explicit {
        /// Start of the period
        start: CalendarTime,
        /// End of the period
        end: CalendarTime,
    },

    /// Period with start time and duration
    Duration {
        /// Start of the period
        start: CalendarTime,
        /// Duration of the period
        duration: Duration,
    },
}

impl Period {
    /// Start of the period.
    #[must_use]
    pub fn start(&self) -> CalendarTime {
        match self {
            Period::Explicit { start, .. } | Period::Duration { start, .. } => start.clone(),
        }
    }

    /// End of the period, computed from the duration when not explicit.
    #[must_use]
    pub fn end(&self) -> CalendarTime {
        match self {
            Period::Explicit { end, .. } => end.clone(),
            Period::Duration { start, duration } => {
                let mut end = start.clone();
                end.add_duration(duration);
                end
            }
        }
    }

    /// Length of the period, computed from the end points when not explicit.
    #[must_use]
    pub fn duration(&self) -> Duration {
        match self {
            Period::Explicit { start, end } => end.subtract_date(start),
            Period::Duration { duration, .. } => *duration,
        }
    }
}

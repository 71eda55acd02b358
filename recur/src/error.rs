// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Error type shared by rule validation, iteration and expansion.

use crate::value::{ByPart, TimeField};

/// Error type for recurrence operations
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurError {
    /// A rule part was given more than once
    #[error("Duplicate rule part '{part}'")]
    DuplicatePart {
        /// Name of the duplicated part
        part: &'static str,
    },

    /// The FREQ rule part is required
    #[error("Missing required rule part 'FREQ'")]
    MissingFrequency,

    /// UNTIL and COUNT are mutually exclusive
    #[error("Rule parts 'UNTIL' and 'COUNT' must not occur together")]
    CountAndUntil,

    /// INTERVAL must be a positive integer
    #[error("Rule part 'INTERVAL' must be positive")]
    ZeroInterval,

    /// COUNT must be a positive integer
    #[error("Rule part 'COUNT' must be positive")]
    ZeroCount,

    /// A BY* value is outside of its legal range
    #[error("Value {value} is out of range for '{part}'")]
    OutOfRange {
        /// The rule part holding the value
        part: ByPart,
        /// The offending value
        value: i32,
    },

    /// A weekday designator could not be recognized
    #[error("Invalid weekday designator '{0}'")]
    InvalidWeekDay(String),

    /// Rule parts that cannot be combined
    #[error("Incompatible rule parts: {message}")]
    IncompatibleParts {
        /// Description of the conflict
        message: String,
    },

    /// A calendar time field is outside of its legal range
    #[error("Value {value} is out of range for {field}")]
    InvalidDateTime {
        /// The field holding the value
        field: TimeField,
        /// The offending value
        value: i32,
    },

    /// The iterator produced the same occurrence repeatedly
    #[error("Recurrence iterator produced the same occurrence twice: {occurrence}")]
    SameOccurrenceTwice {
        /// The repeated occurrence, in RFC 5545 basic format
        occurrence: String,
    },

    /// The expansion exceeded its per-step iteration bound
    #[error("Recurrence expansion exceeded {limit} iterations in a single step")]
    IterationLimit {
        /// The configured bound
        limit: u32,
    },

    /// Configuration could not be read or parsed
    #[error("Invalid configuration: {0}")]
    Config(String),
}

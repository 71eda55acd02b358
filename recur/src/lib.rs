// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expand RFC 5545 recurrences and resolve UTC offsets from timezone definitions.
//!
//! Build a [`RecurrenceRule`], iterate it from a start [`CalendarTime`] with a
//! [`RecurIterator`], or merge rules with explicit dates through a [`RecurrenceExpansion`].
//! Zones are described declaratively with a [`TimezoneDefinition`] and queried through the
//! lazily expanded transition table of a [`Timezone`].
//!
//! ```
//! use aimcal_recur::{CalendarTime, Frequency, RecurrenceRule};
//!
//! let rule = RecurrenceRule::builder(Frequency::Daily).count(3).build()?;
//! let start = CalendarTime::date(2024, 1, 1);
//! let days: Vec<String> = rule
//!     .iterator(&start)
//!     .map(|t| t.map(|t| t.to_string()))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(days, ["20240101", "20240102", "20240103"]);
//! # Ok::<(), aimcal_recur::RecurError>(())
//! ```

#![warn(
    trivial_casts,
    trivial_numeric_casts,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications,
    clippy::dbg_macro,
    clippy::indexing_slicing,
    clippy::pedantic
)]
// Allow certain clippy lints that are too restrictive for this crate
#![allow(
    clippy::similar_names,
    clippy::single_match_else,
    clippy::match_bool,
    clippy::module_name_repetitions
)]

mod config;
mod error;
mod expansion;
pub mod iterator;
mod keyword;
pub mod timezone;
pub mod value;

pub use crate::config::Config;
pub use crate::error::RecurError;
pub use crate::expansion::{
    ExpansionState, RecurrenceDate, RecurrenceExpansion, RecurrenceSet, RuleProgress,
};
pub use crate::iterator::{IteratorState, RecurIterator};
pub use crate::timezone::{
    Observance, Timezone, TimezoneDefinition, Transition, UtcOffset, Zone, registry,
};
pub use crate::value::{
    ByPart, CalendarTime, Duration, Frequency, Period, RecurrenceRule, RecurrenceRuleBuilder,
    RulePart, TimeData, TimeField, WeekDay, WeekDayNum,
};

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! UTC offset resolution from declarative timezone definitions.
//!
//! A [`TimezoneDefinition`] is the in-memory equivalent of a VTIMEZONE block. A [`Timezone`]
//! expands it lazily into a sorted list of [`Transition`]s and answers offset queries against
//! that list. Values refer to zones through [`Zone`].

mod definition;
pub mod registry;
mod table;

use std::sync::Arc;

pub use definition::{Observance, TimezoneDefinition, UtcOffset};
pub use table::{Timezone, Transition};

use crate::keyword::KW_UTC;
use crate::value::Parts;

/// The zone a [`CalendarTime`](crate::CalendarTime) is expressed in
#[derive(Debug, Clone, Default)]
pub enum Zone {
    /// Wall-clock time without any zone; read as UTC wherever an instant is needed
    #[default]
    Floating,

    /// Coordinated Universal Time
    Utc,

    /// A zone backed by a transition table
    Tz(Arc<Timezone>),
}

impl Zone {
    /// Identifier of the zone, `None` when floating.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Zone::Floating => None,
            Zone::Utc => Some(KW_UTC),
            Zone::Tz(tz) => Some(tz.tzid()),
        }
    }

    /// Whether the zone is floating.
    #[must_use]
    pub const fn is_floating(&self) -> bool {
        matches!(self, Zone::Floating)
    }

    /// Whether the zone is UTC.
    #[must_use]
    pub const fn is_utc(&self) -> bool {
        matches!(self, Zone::Utc)
    }

    pub(crate) fn utc_offset(&self, parts: &Parts) -> i32 {
        match self {
            Zone::Floating | Zone::Utc => 0,
            Zone::Tz(tz) => tz.offset_at(parts),
        }
    }
}

impl PartialEq for Zone {
    fn eq(&self, other: &Self) -> bool {
        self.tzid() == other.tzid()
    }
}

impl Eq for Zone {}

impl From<Arc<Timezone>> for Zone {
    fn from(value: Arc<Timezone>) -> Self {
        Zone::Tz(value)
    }
}

impl From<Timezone> for Zone {
    fn from(value: Timezone) -> Self {
        Zone::Tz(Arc::new(value))
    }
}

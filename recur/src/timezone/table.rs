// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::sync::{PoisonError, RwLock};

use crate::config::Config;
use crate::iterator::RecurIterator;
use crate::timezone::{Observance, TimezoneDefinition, Zone};
use crate::value::{CalendarTime, Parts};

/// Transitions are never expanded past this year; later lookups use the last one.
const LAST_COVERED_YEAR: i32 = 9999;

/// A single change of UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Instant of the change, as UTC wall-clock fields
    at: Parts,
    /// Offset in force after the change, in seconds
    pub utc_offset: i32,
    /// Offset in force before the change, in seconds
    pub prev_utc_offset: i32,
    /// Whether the change enters daylight saving time
    pub is_daylight: bool,
}

impl Transition {
    /// Instant of the change in UTC.
    #[must_use]
    pub fn time(&self) -> CalendarTime {
        CalendarTime::from_parts(self.at, false, Zone::Utc)
    }

    fn shifted(&self, seconds: i32) -> Parts {
        self.at.adjusted(0, 0, 0, i64::from(seconds), false)
    }
}

#[derive(Debug, Default)]
struct Transitions {
    list: Vec<Transition>,
    expanded_until: Option<i32>,
}

/// Offset transition table of a timezone
///
/// Transitions are expanded on first use up to a few years past the queried (or current) year,
/// and the whole list is rebuilt further out whenever a later year is queried. The cache sits
/// behind a lock, so a table may be shared between threads.
#[derive(Debug)]
pub struct Timezone {
    definition: TimezoneDefinition,
    config: Config,
    cache: RwLock<Transitions>,
}

impl Timezone {
    /// Build a table with the default configuration.
    #[must_use]
    pub fn new(definition: TimezoneDefinition) -> Self {
        Self::with_config(definition, Config::default())
    }

    /// Build a table.
    #[must_use]
    pub fn with_config(definition: TimezoneDefinition, config: Config) -> Self {
        Self {
            definition,
            config,
            cache: RwLock::new(Transitions::default()),
        }
    }

    /// Timezone identifier
    #[must_use]
    pub fn tzid(&self) -> &str {
        &self.definition.tz_id
    }

    /// The definition the table is built from
    #[must_use]
    pub const fn definition(&self) -> &TimezoneDefinition {
        &self.definition
    }

    /// Offset from UTC in seconds at a wall-clock time of this zone.
    ///
    /// Only the civil fields of `time` are used; its own zone is ignored.
    #[must_use]
    pub fn utc_offset(&self, time: &CalendarTime) -> i32 {
        self.offset_at(&time.parts())
    }

    /// Transitions up to and including `year`.
    #[must_use]
    pub fn transitions(&self, year: i32) -> Vec<Transition> {
        self.ensure_coverage(year);
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        cache
            .list
            .iter()
            .take_while(|t| t.at.year <= year)
            .copied()
            .collect()
    }

    pub(crate) fn offset_at(&self, local: &Parts) -> i32 {
        self.ensure_coverage(local.year);
        let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
        find_offset(&cache.list, local)
    }

    fn ensure_coverage(&self, year: i32) {
        let year = year.min(LAST_COVERED_YEAR);
        let covered = |t: &Transitions| t.expanded_until.is_some_and(|until| until >= year);
        if covered(&self.cache.read().unwrap_or_else(PoisonError::into_inner)) {
            return;
        }

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        if covered(&cache) {
            return;
        }
        let horizon = year
            .max(CalendarTime::now().year())
            .saturating_add(self.config.timezone_extra_coverage)
            .min(LAST_COVERED_YEAR);
        cache.list = self.expand(horizon);
        cache.expanded_until = Some(horizon);
    }

    #[tracing::instrument(skip(self), fields(tzid = %self.definition.tz_id))]
    fn expand(&self, horizon: i32) -> Vec<Transition> {
        let mut list = Vec::new();
        for observance in &self.definition.standard {
            self.expand_observance(observance, false, horizon, &mut list);
        }
        for observance in &self.definition.daylight {
            self.expand_observance(observance, true, horizon, &mut list);
        }
        list.sort_by_key(|t| t.at);
        tracing::debug!(count = list.len(), "expanded timezone transitions");
        list
    }

    fn expand_observance(
        &self,
        observance: &Observance,
        is_daylight: bool,
        horizon: i32,
        list: &mut Vec<Transition>,
    ) {
        let from = observance.offset_from.as_seconds();
        let change = |local: &CalendarTime| Transition {
            at: local.parts().adjusted(0, 0, 0, -i64::from(from), false),
            utc_offset: observance.offset_to.as_seconds(),
            prev_utc_offset: from,
            is_daylight,
        };

        if observance.rrule.is_none() && observance.rdates.is_empty() {
            list.push(change(&observance.dtstart));
        }

        for rdate in &observance.rdates {
            if rdate.zone().is_utc() {
                list.push(Transition {
                    at: rdate.parts(),
                    ..change(rdate)
                });
            } else {
                list.push(change(rdate));
            }
        }

        let Some(rule) = &observance.rrule else {
            return;
        };

        let mut rule = rule.clone();
        if let Some(until) = rule.until().filter(|u| u.zone().is_utc()) {
            // Onsets are produced in local time, so move a UTC bound there as well
            let mut local = until.clone().with_zone(Zone::Floating);
            local.adjust(0, 0, 0, i64::from(from));
            rule.set_until(Some(local));
        }

        let dtstart = observance.dtstart.clone().with_zone(Zone::Floating);
        for occurrence in RecurIterator::with_config(rule, dtstart, self.config) {
            match occurrence {
                Ok(onset) if onset.year() > horizon => break,
                Ok(onset) => list.push(change(&onset)),
                Err(error) => {
                    tracing::warn!(%error, "skipping the rest of a malformed observance");
                    break;
                }
            }
        }
    }
}

/// Resolve the offset in force at a local wall-clock time.
fn find_offset(list: &[Transition], local: &Parts) -> i32 {
    let (Some(first), Some(last_index)) = (list.first(), list.len().checked_sub(1)) else {
        return 0;
    };

    // Compare against each change at the earlier of its two local readings
    let effective = |t: &Transition| t.shifted(t.utc_offset.min(t.prev_utc_offset));

    let mut index = list.partition_point(|t| t.at < *local).min(last_index);
    let mut found = None;
    let mut backwards = false;
    loop {
        let Some(change) = list.get(index) else {
            break;
        };
        if *local >= effective(change) {
            found = Some(index);
        } else {
            backwards = true;
        }
        if backwards && found.is_some() {
            break;
        }

        if backwards {
            let Some(prev) = index.checked_sub(1) else {
                // Before the first transition
                return first.prev_utc_offset;
            };
            index = prev;
        } else {
            index += 1;
        }
    }

    let Some(mut found) = found else {
        return first.prev_utc_offset;
    };

    // Inside the hour repeated by an offset decrease prefer standard time
    let Some(change) = list.get(found) else {
        return 0;
    };
    if change.utc_offset < change.prev_utc_offset
        && *local < change.shifted(change.prev_utc_offset)
        && change.is_daylight
        && found > 0
    {
        found -= 1;
    }
    list.get(found).map_or(0, |t| t.utc_offset)
}

// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Merged occurrence stream of RRULEs, RDATEs and EXDATEs.

use std::cmp::Ordering;
use std::iter::FusedIterator;

use crate::RecurError;
use crate::config::Config;
use crate::iterator::{IteratorState, RecurIterator};
use crate::value::{CalendarTime, Period, RecurrenceRule};

/// An explicit recurrence date, either an instant or a period starting at it
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceDate {
    /// A date or date-time
    Time(CalendarTime),

    /// A period; the occurrence is its start
    Period(Period),
}

impl RecurrenceDate {
    /// Start of the occurrence
    #[must_use]
    pub fn start(&self) -> CalendarTime {
        match self {
            RecurrenceDate::Time(time) => time.clone(),
            RecurrenceDate::Period(period) => period.start(),
        }
    }
}

impl From<CalendarTime> for RecurrenceDate {
    fn from(time: CalendarTime) -> Self {
        RecurrenceDate::Time(time)
    }
}

impl From<Period> for RecurrenceDate {
    fn from(period: Period) -> Self {
        RecurrenceDate::Period(period)
    }
}

/// Recurrence properties of an event: DTSTART with its RRULEs, RDATEs and EXDATEs
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RecurrenceSet {
    /// Start of the first instance
    pub dtstart: CalendarTime,

    /// Recurrence rules
    #[serde(default)]
    pub rrules: Vec<RecurrenceRule>,

    /// Additional dates
    #[serde(default)]
    pub rdates: Vec<RecurrenceDate>,

    /// Excluded dates; a date-only value excludes the whole day
    #[serde(default)]
    pub exdates: Vec<CalendarTime>,

    /// Whether the event overrides a single instance of another recurrence
    #[serde(default)]
    pub is_exception: bool,
}

impl RecurrenceSet {
    /// A set without any recurrence, producing only `dtstart`.
    #[must_use]
    pub const fn new(dtstart: CalendarTime) -> Self {
        Self {
            dtstart,
            rrules: Vec::new(),
            rdates: Vec::new(),
            exdates: Vec::new(),
            is_exception: false,
        }
    }

    /// Add a recurrence rule.
    #[must_use]
    pub fn with_rrule(mut self, rule: RecurrenceRule) -> Self {
        self.rrules.push(rule);
        self
    }

    /// Add an explicit recurrence date.
    #[must_use]
    pub fn with_rdate(mut self, rdate: impl Into<RecurrenceDate>) -> Self {
        self.rdates.push(rdate.into());
        self
    }

    /// Add an excluded date.
    #[must_use]
    pub fn with_exdate(mut self, exdate: CalendarTime) -> Self {
        self.exdates.push(exdate);
        self
    }

    /// Mark the set as belonging to an exception instance.
    #[must_use]
    pub const fn exception(mut self) -> Self {
        self.is_exception = true;
        self
    }

    /// Whether the set recurs at all
    #[must_use]
    pub fn is_recurring(&self) -> bool {
        !self.rrules.is_empty() || !self.rdates.is_empty()
    }

    /// Iterate the occurrences of the set.
    #[must_use]
    pub fn iter(&self) -> RecurrenceExpansion {
        RecurrenceExpansion::new(self.clone())
    }
}

#[derive(Debug, Clone)]
struct RuleCursor {
    iter: RecurIterator,
    head: Option<CalendarTime>,
}

impl RuleCursor {
    fn fill(&mut self) -> Result<(), RecurError> {
        if self.head.is_none() && !self.iter.is_completed() {
            self.head = self.iter.next_occurrence()?;
        }
        Ok(())
    }
}

/// Progress of one rule within an [`ExpansionState`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RuleProgress {
    /// State of the rule's iterator
    pub iterator: IteratorState,

    /// Occurrence pulled from the iterator but not merged yet
    pub pending: Option<CalendarTime>,
}

/// Plain-data snapshot of a [`RecurrenceExpansion`]
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExpansionState {
    /// Start of the recurrence
    pub dtstart: CalendarTime,

    /// Last occurrence emitted
    pub last: Option<CalendarTime>,

    /// Sorted recurrence dates
    pub rdates: Vec<CalendarTime>,

    /// Cursor into `rdates`
    pub rdate_index: usize,

    /// Sorted excluded dates
    pub exdates: Vec<CalendarTime>,

    /// Cursor into `exdates`
    pub exdate_index: usize,

    /// One entry per recurrence rule
    pub rules: Vec<RuleProgress>,

    /// Whether the expansion has finished
    pub completed: bool,

    /// Search limits in effect
    #[serde(default)]
    pub config: Config,
}

/// Time-ordered, deduplicated occurrences of a [`RecurrenceSet`]
#[derive(Debug, Clone)]
pub struct RecurrenceExpansion {
    dtstart: CalendarTime,
    last: Option<CalendarTime>,
    rdates: Vec<CalendarTime>,
    rdate_index: usize,
    exdates: Vec<CalendarTime>,
    exdate_index: usize,
    rules: Vec<RuleCursor>,
    completed: bool,
    config: Config,
}

impl RecurrenceExpansion {
    /// Create an expansion with the default configuration.
    #[must_use]
    pub fn new(set: RecurrenceSet) -> Self {
        Self::with_config(set, Config::default())
    }

    /// Create an expansion.
    #[must_use]
    pub fn with_config(set: RecurrenceSet, config: Config) -> Self {
        let RecurrenceSet {
            dtstart,
            rrules,
            rdates,
            exdates,
            is_exception,
        } = set;

        let single = rrules.is_empty() && rdates.is_empty() && !is_exception;
        let mut rdates: Vec<CalendarTime> = rdates.iter().map(RecurrenceDate::start).collect();
        let mut exdates = if single { Vec::new() } else { exdates };
        if rrules.is_empty() && (single || !rdates.is_empty()) {
            rdates.push(dtstart.clone());
        }
        rdates.sort();
        rdates.dedup();
        exdates.sort();

        let rules = rrules
            .into_iter()
            .map(|rule| RuleCursor {
                iter: RecurIterator::with_config(rule, dtstart.clone(), config),
                head: None,
            })
            .collect();

        Self {
            dtstart,
            last: None,
            rdates,
            rdate_index: 0,
            exdates,
            exdate_index: 0,
            rules,
            completed: false,
            config,
        }
    }

    /// Start of the recurrence
    #[must_use]
    pub const fn dtstart(&self) -> &CalendarTime {
        &self.dtstart
    }

    /// Last occurrence emitted
    #[must_use]
    pub const fn last(&self) -> Option<&CalendarTime> {
        self.last.as_ref()
    }

    /// Whether no further occurrences will be produced
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Produce the next occurrence, or `None` once every source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::IterationLimit`] when too many candidates in a row are discarded,
    /// and propagates errors of the underlying rule iterators. The expansion is completed
    /// after an error.
    pub fn next_occurrence(&mut self) -> Result<Option<CalendarTime>, RecurError> {
        if self.completed {
            return Ok(None);
        }

        match self.merge() {
            Ok(Some(next)) => Ok(Some(next)),
            Ok(None) => {
                tracing::debug!(start = %self.dtstart, "recurrence expansion completed");
                self.completed = true;
                Ok(None)
            }
            Err(err) => {
                self.completed = true;
                Err(err)
            }
        }
    }

    fn merge(&mut self) -> Result<Option<CalendarTime>, RecurError> {
        let limit = self.config.expansion_max_iterations;
        for _ in 0..limit {
            for rule in &mut self.rules {
                rule.fill()?;
            }

            let rdate = self.rdates.get(self.rdate_index);
            let earliest_rule = self.rules.iter().filter_map(|r| r.head.as_ref()).min();
            let next = match (rdate, earliest_rule) {
                (None, None) => return Ok(None),
                (Some(rdate), Some(rule)) => rdate.min(rule).clone(),
                (Some(rdate), None) => rdate.clone(),
                (None, Some(rule)) => rule.clone(),
            };

            // Consume every source sitting on this occurrence
            if self.rdates.get(self.rdate_index) == Some(&next) {
                self.rdate_index += 1;
            }
            for rule in &mut self.rules {
                if rule.head.as_ref() == Some(&next) {
                    rule.head = None;
                }
            }

            if self.last.as_ref().is_some_and(|last| *last >= next) {
                continue;
            }
            if self.is_excluded(&next) {
                tracing::trace!(occurrence = %next, "occurrence excluded");
                continue;
            }

            self.last = Some(next.clone());
            return Ok(Some(next));
        }

        tracing::warn!(start = %self.dtstart, limit, "recurrence expansion gave up");
        Err(RecurError::IterationLimit { limit })
    }

    /// Whether an EXDATE matches the occurrence, advancing past EXDATEs before it.
    fn is_excluded(&mut self, occurrence: &CalendarTime) -> bool {
        while let Some(exdate) = self.exdates.get(self.exdate_index) {
            let ord = if exdate.is_date() {
                exdate.compare_date_only(occurrence)
            } else {
                exdate.cmp(occurrence)
            };
            match ord {
                Ordering::Less => self.exdate_index += 1,
                Ordering::Equal => {
                    // A date-only EXDATE stays in force for the rest of its day
                    if !exdate.is_date() {
                        self.exdate_index += 1;
                    }
                    return true;
                }
                Ordering::Greater => return false,
            }
        }
        false
    }

    /// Snapshot of the complete expansion state.
    #[must_use]
    pub fn state(&self) -> ExpansionState {
        ExpansionState {
            dtstart: self.dtstart.clone(),
            last: self.last.clone(),
            rdates: self.rdates.clone(),
            rdate_index: self.rdate_index,
            exdates: self.exdates.clone(),
            exdate_index: self.exdate_index,
            rules: self
                .rules
                .iter()
                .map(|r| RuleProgress {
                    iterator: r.iter.state(),
                    pending: r.head.clone(),
                })
                .collect(),
            completed: self.completed,
            config: self.config,
        }
    }

    /// Resume from a snapshot taken by [`RecurrenceExpansion::state`].
    #[must_use]
    pub fn from_state(state: ExpansionState) -> Self {
        Self {
            dtstart: state.dtstart,
            last: state.last,
            rdates: state.rdates,
            rdate_index: state.rdate_index,
            exdates: state.exdates,
            exdate_index: state.exdate_index,
            rules: state
                .rules
                .into_iter()
                .map(|r| RuleCursor {
                    iter: RecurIterator::from_state(r.iterator),
                    head: r.pending,
                })
                .collect(),
            completed: state.completed,
            config: state.config,
        }
    }
}

impl Iterator for RecurrenceExpansion {
    type Item = Result<CalendarTime, RecurError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_occurrence().transpose()
    }
}

impl FusedIterator for RecurrenceExpansion {}

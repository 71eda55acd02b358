// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Tunable search bounds for iteration, expansion and timezone tables.

use std::path::Path;
use std::str::FromStr;

use crate::RecurError;

/// Configuration for the recurrence engine.
///
/// Every field has a default, so an empty TOML document is a valid configuration:
///
/// ```toml
/// yearly_search_years = 20000
/// monthly_search_months = 48
/// same_occurrence_retries = 1
/// expansion_max_iterations = 500
/// max_skipped_candidates = 1000000
/// timezone_extra_coverage = 5
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    /// Years past the start year a YEARLY rule without UNTIL is searched for candidates.
    pub yearly_search_years: i32,

    /// Months searched for a MONTHLY BYDAY or BYMONTHDAY candidate before giving up.
    pub monthly_search_months: u32,

    /// Extra advances tolerated when the iterator repeats its last occurrence.
    pub same_occurrence_retries: u32,

    /// Bound on the merge loop of a single expansion step.
    pub expansion_max_iterations: u32,

    /// Candidates a single iterator step may reject before giving up.
    pub max_skipped_candidates: u32,

    /// Years past the requested (or current) year that timezone transitions cover.
    pub timezone_extra_coverage: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            yearly_search_years: 20_000,
            monthly_search_months: 48,
            same_occurrence_retries: 1,
            expansion_max_iterations: 500,
            max_skipped_candidates: 1_000_000,
            timezone_extra_coverage: 5,
        }
    }
}

impl Config {
    /// Load the configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`RecurError::Config`] if the file cannot be read or parsed.
    #[tracing::instrument]
    pub fn load(path: &Path) -> Result<Self, RecurError> {
        std::fs::read_to_string(path)
            .map_err(|e| {
                RecurError::Config(format!(
                    "Failed to read config file at {}: {e}",
                    path.display()
                ))
            })?
            .parse()
    }
}

impl FromStr for Config {
    type Err = RecurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        toml::from_str(s).map_err(|e| RecurError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_empty_config_as_default() {
        let config: Config = "".parse().unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn parses_partial_config() {
        let config: Config = "monthly_search_months = 12\ntimezone_extra_coverage = 2"
            .parse()
            .unwrap();
        assert_eq!(config.monthly_search_months, 12);
        assert_eq!(config.timezone_extra_coverage, 2);
        assert_eq!(config.expansion_max_iterations, 500);
        assert_eq!(config.max_skipped_candidates, 1_000_000);
    }

    #[test]
    fn rejects_mistyped_config() {
        let result = "expansion_max_iterations = \"many\"".parse::<Config>();
        assert!(matches!(result, Err(RecurError::Config(_))));
    }
}

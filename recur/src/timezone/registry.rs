// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Process-wide map from timezone identifiers to transition tables.
//!
//! Deserialized times look their tzid up here; register a table before restoring snapshots that
//! refer to it.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::timezone::Timezone;

type Registry = RwLock<HashMap<String, Arc<Timezone>>>;

fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::default)
}

/// Register a table under its own tzid, replacing any previous one.
pub fn register(timezone: impl Into<Arc<Timezone>>) -> Arc<Timezone> {
    let timezone = timezone.into();
    tracing::debug!(tzid = timezone.tzid(), "registering timezone");
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(timezone.tzid().to_owned(), Arc::clone(&timezone));
    timezone
}

/// Look up a table by tzid.
#[must_use]
pub fn get(tzid: &str) -> Option<Arc<Timezone>> {
    registry()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(tzid)
        .cloned()
}

/// Remove a table, returning it if it was registered.
pub fn remove(tzid: &str) -> Option<Arc<Timezone>> {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove(tzid)
}

/// Remove every table.
pub fn reset() {
    registry()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .clear();
}

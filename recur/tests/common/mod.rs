// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Common test utilities for integration tests.

mod fixtures;

#[allow(unused_imports)]
pub use fixtures::{collect, collect_all, new_york, new_york_definition};

// Copyright (c) 2024-2026 Nervosys LLC
// SPDX-License-Identifier: AGPL-3.0-only
//! Command implementations

mod content;
mod session;
mod validate;

pub use content::*;
pub use session::*;
pub use validate::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Widgetlink: core types and error definitions shared across all crates.

pub mod codes;
pub mod config;
pub mod error;
pub mod types;

pub use codes::{ErrorCode, ErrorKind, WireError};
pub use config::BridgeConfig;
pub use error::WidgetError;
pub use types::*;

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Widgetlink.

use thiserror::Error;

/// Top-level error type for all Widgetlink operations.
#[derive(Debug, Error)]
pub enum WidgetError {
    // -- Caller input --
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    PreconditionFailed(String),

    // -- Resolution --
    #[error("target app not found: {0}")]
    TargetNotFound(String),

    #[error("widget provider not found: {0}")]
    ProviderNotFound(String),

    #[error("view element {0} does not exist")]
    ViewResolutionFailed(String),

    // -- Payloads --
    #[error("failed to decode widget image: {0}")]
    ImageDecodeFailed(String),

    // -- Host platform --
    #[error("{0}")]
    HostOperationFailed(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WidgetError {
    /// Shorthand for a required field that was not supplied.
    pub fn missing(field: &str) -> Self {
        Self::InvalidArgument(format!("{field} is required!"))
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WidgetError>;

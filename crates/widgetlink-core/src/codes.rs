// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Wire error codes reported back to the application layer.
//
// Every `WidgetError` is classified into one of four kinds, and every kind
// maps onto a small integer code whose meaning is fixed across commands.

use serde::{Deserialize, Serialize};

use crate::error::WidgetError;

/// Error taxonomy shared by all commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Caller-supplied data missing or malformed. Never retried.
    InvalidArgument,
    /// The operation needs prior state (e.g. a configuration session).
    PreconditionFailed,
    /// A named provider, launch target or view element could not be located.
    ResolutionFailure,
    /// The underlying platform call raised an error.
    HostOperationFailed,
}

/// Integer codes carried in the `(errorCode, message)` reply pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// `-1`: invalid or missing argument.
    InvalidArgument,
    /// `-2`: operation failed.
    OperationFailed,
    /// `-3`: target, provider or view element not found.
    ResolutionFailure,
}

impl ErrorCode {
    pub fn as_i32(self) -> i32 {
        match self {
            Self::InvalidArgument => -1,
            Self::OperationFailed => -2,
            Self::ResolutionFailure => -3,
        }
    }
}

impl From<ErrorKind> for ErrorCode {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::InvalidArgument => Self::InvalidArgument,
            ErrorKind::ResolutionFailure => Self::ResolutionFailure,
            ErrorKind::PreconditionFailed | ErrorKind::HostOperationFailed => {
                Self::OperationFailed
            }
        }
    }
}

/// The serialized error half of a reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireError {
    pub code: i32,
    pub message: String,
}

impl WidgetError {
    /// Classify this error into the shared taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WidgetError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            WidgetError::PreconditionFailed(_) => ErrorKind::PreconditionFailed,

            WidgetError::TargetNotFound(_)
            | WidgetError::ProviderNotFound(_)
            | WidgetError::ViewResolutionFailed(_) => ErrorKind::ResolutionFailure,

            // A picture the caller sent that cannot be decoded is an
            // operation failure on the wire, as with the host's own decoder.
            WidgetError::ImageDecodeFailed(_)
            | WidgetError::HostOperationFailed(_)
            | WidgetError::Io(_)
            | WidgetError::Serialization(_) => ErrorKind::HostOperationFailed,
        }
    }

    /// Wire code for this error.
    pub fn code(&self) -> ErrorCode {
        self.kind().into()
    }
}

impl From<&WidgetError> for WireError {
    fn from(err: &WidgetError) -> Self {
        Self {
            code: err.code().as_i32(),
            message: err.to_string(),
        }
    }
}

impl From<WidgetError> for WireError {
    fn from(err: WidgetError) -> Self {
        Self::from(&err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_fixed() {
        assert_eq!(ErrorCode::InvalidArgument.as_i32(), -1);
        assert_eq!(ErrorCode::OperationFailed.as_i32(), -2);
        assert_eq!(ErrorCode::ResolutionFailure.as_i32(), -3);
    }

    #[test]
    fn missing_field_is_invalid_argument() {
        let wire = WireError::from(WidgetError::missing("widgetInstanceId"));
        assert_eq!(wire.code, -1);
        assert_eq!(wire.message, "widgetInstanceId is required!");
    }

    #[test]
    fn precondition_maps_to_operation_failed() {
        let err = WidgetError::PreconditionFailed("Not attached to any activity!".into());
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(err.code(), ErrorCode::OperationFailed);
    }

    #[test]
    fn resolution_failures_surface_the_missing_name() {
        let cases = [
            WidgetError::TargetNotFound("com.example.missing".into()),
            WidgetError::ProviderNotFound("com.example.app.ClockWidget".into()),
            WidgetError::ViewResolutionFailed("subtitle".into()),
        ];
        for err in &cases {
            let wire = WireError::from(err);
            assert_eq!(wire.code, -3, "{err}");
        }
        assert!(WireError::from(&cases[2]).message.contains("subtitle"));
    }

    #[test]
    fn host_message_passes_through_verbatim() {
        let wire = WireError::from(WidgetError::HostOperationFailed(
            "AppWidgetManager: binder died".into(),
        ));
        assert_eq!(wire.code, -2);
        assert_eq!(wire.message, "AppWidgetManager: binder died");
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reply envelope returned for every method call.

use serde::Serialize;
use serde_json::Value;
use widgetlink_core::codes::WireError;
use widgetlink_core::error::WidgetError;

/// Outcome of one method call, as seen by the application layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum Reply {
    Success { value: Value },
    Error(WireError),
    /// The bridge does not support the method. Distinct from a failure.
    NotImplemented,
}

impl Reply {
    pub fn success(value: impl Into<Value>) -> Self {
        Self::Success {
            value: value.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The success value, if any.
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success { value } => Some(value),
            _ => None,
        }
    }

    /// The error pair, if any.
    pub fn error(&self) -> Option<&WireError> {
        match self {
            Self::Error(error) => Some(error),
            _ => None,
        }
    }
}

impl From<WidgetError> for Reply {
    fn from(err: WidgetError) -> Self {
        Self::Error(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_shapes() {
        assert_eq!(
            serde_json::to_value(Reply::success(true)).expect("serialize"),
            json!({ "status": "success", "value": true })
        );
        assert_eq!(
            serde_json::to_value(Reply::from(WidgetError::TargetNotFound(
                "com.example.missing".into()
            )))
            .expect("serialize"),
            json!({
                "status": "error",
                "code": -3,
                "message": "target app not found: com.example.missing",
            })
        );
        assert_eq!(
            serde_json::to_value(Reply::NotImplemented).expect("serialize"),
            json!({ "status": "notImplemented" })
        );
    }

    #[test]
    fn accessors() {
        let ok = Reply::success(json!([1, 2]));
        assert!(ok.is_success());
        assert_eq!(ok.value(), Some(&json!([1, 2])));
        assert!(ok.error().is_none());

        let err = Reply::from(WidgetError::missing("layoutId"));
        assert!(!err.is_success());
        assert_eq!(err.error().map(|e| e.code), Some(-1));
    }
}

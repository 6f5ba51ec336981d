// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Typed commands decoded from the application layer's method calls.
//
// Each method name selects a request struct; the argument map is validated
// by serde at this boundary, so handlers only ever see well-formed input.
// Both the documented field names and the legacy channel names are accepted.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{LayoutId, WidgetId};

pub const CANCEL_CONFIGURE_WIDGET: &str = "cancelConfigureWidget";
pub const CONFIGURE_WIDGET: &str = "configureWidget";
pub const GET_WIDGET_IDS: &str = "getWidgetIds";
pub const RELOAD_WIDGETS: &str = "reloadWidgets";
pub const UPDATE_WIDGET: &str = "updateWidget";
pub const WIDGET_EXISTS: &str = "widgetExists";

/// Arguments of `configureWidget`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureWidgetRequest {
    #[serde(alias = "widgetId")]
    pub widget_instance_id: WidgetId,
    pub layout_id: LayoutId,
    pub target_package_name: String,
    pub payload: Option<String>,
    #[serde(alias = "url")]
    pub deep_link: Option<String>,
    /// Base64-encoded image bytes.
    #[serde(alias = "base64Image")]
    pub image: Option<String>,
    #[serde(alias = "textViews")]
    pub view_text: Option<BTreeMap<String, String>>,
}

/// Arguments of `getWidgetIds` and `reloadWidgets`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    #[serde(alias = "androidProviderName")]
    pub provider_type_name: String,
    #[serde(alias = "androidPackageName")]
    pub package: Option<String>,
}

/// Arguments of `updateWidget`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWidgetRequest {
    #[serde(alias = "widgetId")]
    pub widget_instance_id: WidgetId,
    pub layout_id: LayoutId,
    pub payload: Option<String>,
    #[serde(alias = "url")]
    pub deep_link: Option<String>,
    #[serde(alias = "textViews")]
    pub view_text: Option<BTreeMap<String, String>>,
}

/// Arguments of `widgetExists`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetExistsRequest {
    #[serde(alias = "widgetId")]
    pub widget_instance_id: Option<WidgetId>,
}

/// One decoded method call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    CancelConfigureWidget,
    ConfigureWidget(ConfigureWidgetRequest),
    GetWidgetIds(ProviderQuery),
    ReloadWidgets(ProviderQuery),
    UpdateWidget(UpdateWidgetRequest),
    WidgetExists(WidgetExistsRequest),
}

impl Command {
    /// Decode a method call.
    ///
    /// Returns `Ok(None)` for a method this bridge does not implement, and
    /// `InvalidArgument` when the arguments do not fit the method.
    pub fn decode(method: &str, arguments: Value) -> Result<Option<Self>> {
        let arguments = match arguments {
            Value::Null => Value::Object(Default::default()),
            other => other,
        };

        let command = match method {
            CANCEL_CONFIGURE_WIDGET => Self::CancelConfigureWidget,
            CONFIGURE_WIDGET => Self::ConfigureWidget(arguments_of(arguments)?),
            GET_WIDGET_IDS => Self::GetWidgetIds(arguments_of(arguments)?),
            RELOAD_WIDGETS => Self::ReloadWidgets(arguments_of(arguments)?),
            UPDATE_WIDGET => Self::UpdateWidget(arguments_of(arguments)?),
            // An absent or unreadable id is an answer ("no such widget"),
            // not a caller error.
            WIDGET_EXISTS | "widgetExist" => {
                Self::WidgetExists(serde_json::from_value(arguments).unwrap_or_default())
            }
            _ => return Ok(None),
        };
        Ok(Some(command))
    }

    /// Canonical method name of this command.
    pub fn method(&self) -> &'static str {
        match self {
            Self::CancelConfigureWidget => CANCEL_CONFIGURE_WIDGET,
            Self::ConfigureWidget(_) => CONFIGURE_WIDGET,
            Self::GetWidgetIds(_) => GET_WIDGET_IDS,
            Self::ReloadWidgets(_) => RELOAD_WIDGETS,
            Self::UpdateWidget(_) => UPDATE_WIDGET,
            Self::WidgetExists(_) => WIDGET_EXISTS,
        }
    }
}

fn arguments_of<T: DeserializeOwned>(arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| WidgetError::InvalidArgument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn configure_with_documented_names() {
        let command = Command::decode(
            CONFIGURE_WIDGET,
            json!({
                "widgetInstanceId": 7,
                "layoutId": 42,
                "targetPackageName": "com.example.notes",
                "payload": "note-7",
                "deepLink": "notes://7",
                "viewText": { "title": "Hello" },
            }),
        )
        .expect("decode")
        .expect("known method");

        let request = match command {
            Command::ConfigureWidget(request) => request,
            other => panic!("unexpected command: {other:?}"),
        };
        assert_eq!(request.widget_instance_id, WidgetId(7));
        assert_eq!(request.layout_id, LayoutId(42));
        assert_eq!(request.deep_link.as_deref(), Some("notes://7"));
        assert_eq!(request.image, None);
        assert_eq!(
            request.view_text.expect("view text").get("title").map(String::as_str),
            Some("Hello")
        );
    }

    #[test]
    fn update_with_legacy_channel_names() {
        let command = Command::decode(
            UPDATE_WIDGET,
            json!({
                "widgetId": 3,
                "layoutId": 11,
                "url": "notes://3",
                "textViews": { "body": "World" },
            }),
        )
        .expect("decode")
        .expect("known method");

        let request = match command {
            Command::UpdateWidget(request) => request,
            other => panic!("unexpected command: {other:?}"),
        };
        assert_eq!(request.widget_instance_id, WidgetId(3));
        assert_eq!(request.deep_link.as_deref(), Some("notes://3"));
        assert!(request.payload.is_none());
    }

    #[test]
    fn missing_target_package_is_invalid_argument() {
        let err = Command::decode(
            CONFIGURE_WIDGET,
            json!({ "widgetInstanceId": 7, "layoutId": 42 }),
        )
        .expect_err("must fail");
        match err {
            WidgetError::InvalidArgument(message) => {
                assert!(message.contains("targetPackageName"), "{message}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn wrong_type_is_invalid_argument() {
        let err = Command::decode(
            UPDATE_WIDGET,
            json!({ "widgetInstanceId": "seven", "layoutId": 42 }),
        )
        .expect_err("must fail");
        assert!(matches!(err, WidgetError::InvalidArgument(_)));
    }

    #[test]
    fn provider_query_needs_a_name() {
        let err = Command::decode(GET_WIDGET_IDS, Value::Null).expect_err("must fail");
        assert!(matches!(err, WidgetError::InvalidArgument(_)));

        let command = Command::decode(
            RELOAD_WIDGETS,
            json!({ "androidProviderName": "ClockWidget", "androidPackageName": "com.example.other" }),
        )
        .expect("decode")
        .expect("known method");
        assert_eq!(
            command,
            Command::ReloadWidgets(ProviderQuery {
                provider_type_name: "ClockWidget".into(),
                package: Some("com.example.other".into()),
            })
        );
    }

    #[test]
    fn widget_exists_never_fails_to_decode() {
        for arguments in [Value::Null, json!({ "widgetInstanceId": "x" }), json!([])] {
            let command = Command::decode(WIDGET_EXISTS, arguments)
                .expect("decode")
                .expect("known method");
            assert_eq!(command, Command::WidgetExists(WidgetExistsRequest::default()));
        }

        let command = Command::decode("widgetExist", json!({ "widgetId": 5 }))
            .expect("decode")
            .expect("known method");
        assert_eq!(command.method(), WIDGET_EXISTS);
        assert_eq!(
            command,
            Command::WidgetExists(WidgetExistsRequest {
                widget_instance_id: Some(WidgetId(5)),
            })
        );
    }

    #[test]
    fn cancel_ignores_arguments() {
        let command = Command::decode(CANCEL_CONFIGURE_WIDGET, json!({ "anything": 1 }))
            .expect("decode");
        assert_eq!(command, Some(Command::CancelConfigureWidget));
    }

    #[test]
    fn unknown_method_is_not_implemented() {
        let command = Command::decode("resizeWidget", json!({})).expect("decode");
        assert!(command.is_none());
    }
}

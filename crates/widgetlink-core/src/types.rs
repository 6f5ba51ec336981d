// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Widgetlink bridge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Integer id the host assigns to a placed widget instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(pub i32);

impl std::fmt::Display for WidgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host identifier selecting which declared view tree an update targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayoutId(pub i32);

impl std::fmt::Display for LayoutId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Host identifier of a single view element, as returned when a symbolic
/// element name is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub i32);

/// Correlation id for one configuration session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A registered widget provider type, addressed by package and class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderHandle {
    pub package: String,
    pub class_name: String,
}

impl std::fmt::Display for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.package, self.class_name)
    }
}

/// An activity that can be launched when a widget view is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LaunchTarget {
    pub package: String,
    /// Fully qualified component class. `None` means the package's default
    /// launcher entry.
    pub component: Option<String>,
}

impl std::fmt::Display for LaunchTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.component {
            Some(component) => write!(f, "{}/{}", self.package, component),
            None => f.write_str(&self.package),
        }
    }
}

/// A pre-encoded image validated for display in a widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetImage {
    pub width: u32,
    pub height: u32,
    /// The encoded bytes as received (PNG, JPEG, ...). Hosts decode these
    /// into their own bitmap type.
    pub encoded: Vec<u8>,
}

/// Content pushed into one widget's view tree.
///
/// Transient: built per call, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewUpdateRequest {
    pub layout: LayoutId,
    /// Symbolic element name to display text.
    pub text: BTreeMap<String, String>,
    pub image: Option<WidgetImage>,
}

/// What a click on a rendered widget view should hand back to the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickCallback {
    pub widget_id: WidgetId,
    pub payload: Option<String>,
    pub deep_link: Option<String>,
}

/// Forwarded verbatim when the host asks the app to configure a freshly
/// placed widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureCallback {
    pub widget_instance_id: WidgetId,
    pub layout_id: LayoutId,
    pub layout_name: Option<String>,
}

/// Argument shape of the outbound click callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub payload: Option<String>,
}

/// Result a configuration session reports back to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigureOutcome {
    /// The widget was configured and should be kept.
    Committed(WidgetId),
    /// Configuration was abandoned; the host must not commit the widget.
    Cancelled,
}

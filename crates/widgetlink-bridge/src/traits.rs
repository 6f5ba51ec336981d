// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Platform-agnostic trait definitions for the widget host and the
// application layer.
//
// The host rendering subsystem is an external collaborator. These traits
// capture only what the bridge needs from it: enumerate instances, push a
// view-tree update, identify a view element by name, re-register a click
// callback, and broadcast a reload.

use serde::{Deserialize, Serialize};
use widgetlink_core::error::Result;
use widgetlink_core::types::{
    ConfigureOutcome, LaunchTarget, LayoutId, ProviderHandle, ViewId, WidgetId, WidgetImage,
};

use crate::descriptor::CallbackDescriptor;

/// The native widget host (e.g. Android's `AppWidgetManager`).
///
/// All calls are synchronous from the bridge's point of view.
pub trait WidgetHost {
    /// Human-readable platform name (e.g. "Android", "Memory").
    fn platform_name(&self) -> &str;

    /// Package of the process hosting the bridge.
    fn own_package(&self) -> &str;

    /// All live instance ids bound to `provider`, in host order.
    fn widget_ids(&self, provider: &ProviderHandle) -> Result<Vec<WidgetId>>;

    /// Whether the host currently recognizes `widget_id`.
    fn widget_exists(&self, widget_id: WidgetId) -> Result<bool>;

    /// Identify a view element of `layout` by symbolic name. `None` if the
    /// layout has no element with that name. Hosts whose element ids are
    /// package-wide (Android's `getIdentifier`) may ignore `layout`.
    fn resolve_view(&self, layout: LayoutId, name: &str) -> Result<Option<ViewId>>;

    /// Launch entry point of `package`, or `None` if it has none.
    fn launch_target(&self, package: &str) -> Result<Option<LaunchTarget>>;

    /// Replace the widget's whole view tree with `batch`.
    fn update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()>;

    /// Apply `batch` in place. Elements the batch does not name are left
    /// untouched.
    fn partially_update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()>;

    /// Re-register `descriptor` under its request code without touching any
    /// view. Elements already firing that code fire the new descriptor.
    fn refresh_callback(&mut self, descriptor: &CallbackDescriptor) -> Result<()>;

    /// Ask the host to run its own update lifecycle for `widget_ids`.
    fn broadcast_reload(&mut self, widget_ids: &[WidgetId]) -> Result<()>;
}

impl<H: WidgetHost + ?Sized> WidgetHost for Box<H> {
    fn platform_name(&self) -> &str {
        (**self).platform_name()
    }

    fn own_package(&self) -> &str {
        (**self).own_package()
    }

    fn widget_ids(&self, provider: &ProviderHandle) -> Result<Vec<WidgetId>> {
        (**self).widget_ids(provider)
    }

    fn widget_exists(&self, widget_id: WidgetId) -> Result<bool> {
        (**self).widget_exists(widget_id)
    }

    fn resolve_view(&self, layout: LayoutId, name: &str) -> Result<Option<ViewId>> {
        (**self).resolve_view(layout, name)
    }

    fn launch_target(&self, package: &str) -> Result<Option<LaunchTarget>> {
        (**self).launch_target(package)
    }

    fn update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()> {
        (**self).update_widget(widget_id, batch)
    }

    fn partially_update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()> {
        (**self).partially_update_widget(widget_id, batch)
    }

    fn refresh_callback(&mut self, descriptor: &CallbackDescriptor) -> Result<()> {
        (**self).refresh_callback(descriptor)
    }

    fn broadcast_reload(&mut self, widget_ids: &[WidgetId]) -> Result<()> {
        (**self).broadcast_reload(widget_ids)
    }
}

/// Outbound calls into the application layer.
pub trait AppChannel {
    /// Invoke `method` on the application side with a JSON argument map.
    fn invoke(&self, method: &str, arguments: serde_json::Value) -> Result<()>;
}

/// The activity-style flow the host runs while a new widget is configured.
pub trait ConfigurationActivity {
    /// Report the outcome the host should act on.
    fn set_result(&mut self, outcome: ConfigureOutcome) -> Result<()>;

    /// Close the configuration flow.
    fn finish(&mut self) -> Result<()>;
}

// ---------------------------------------------------------------------------
// View batches
// ---------------------------------------------------------------------------

/// One mutation of a widget's view tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOp {
    SetText { view: ViewId, text: String },
    SetImage { view: ViewId, image: WidgetImage },
    SetClick { view: ViewId, callback: CallbackDescriptor },
}

impl ViewOp {
    /// The element this operation touches.
    pub fn view(&self) -> ViewId {
        match self {
            Self::SetText { view, .. } | Self::SetImage { view, .. } | Self::SetClick { view, .. } => {
                *view
            }
        }
    }
}

/// An ordered set of view mutations against one layout, committed in a
/// single host call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBatch {
    pub layout: LayoutId,
    pub ops: Vec<ViewOp>,
}

impl ViewBatch {
    pub fn new(layout: LayoutId) -> Self {
        Self {
            layout,
            ops: Vec::new(),
        }
    }

    pub fn set_text(&mut self, view: ViewId, text: impl Into<String>) -> &mut Self {
        self.ops.push(ViewOp::SetText {
            view,
            text: text.into(),
        });
        self
    }

    pub fn set_image(&mut self, view: ViewId, image: WidgetImage) -> &mut Self {
        self.ops.push(ViewOp::SetImage { view, image });
        self
    }

    pub fn set_click(&mut self, view: ViewId, callback: CallbackDescriptor) -> &mut Self {
        self.ops.push(ViewOp::SetClick { view, callback });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Launch flags carried on a click descriptor, mirrored on every platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchFlags {
    /// Start the target in a new task.
    pub new_task: bool,
    /// Clear any existing task of the target before launching.
    pub clear_task: bool,
}

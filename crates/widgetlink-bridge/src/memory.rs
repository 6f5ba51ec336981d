// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory widget host for desktop/CI builds where no native widget host
// exists.
//
// Keeps providers, placed instances, declared view elements and the rendered
// state of each widget in plain collections, and records every mutating call
// so callers can inspect exactly what reached the host.
//
// Click descriptors live in one host-wide table keyed by request code, the
// way Android keeps one `PendingIntent` per request code. Rendered elements
// only hold the code, so re-addressing a widget retargets every element that
// already fires for it.

use std::collections::BTreeMap;

use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{
    LaunchTarget, LayoutId, ProviderHandle, ViewId, WidgetId, WidgetImage,
};

use crate::descriptor::CallbackDescriptor;
use crate::traits::{ViewBatch, ViewOp, WidgetHost};

/// First id handed out for declared view elements.
const FIRST_VIEW_ID: i32 = 0x7f0a_0001;

/// A mutating call that reached the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Update { widget_id: WidgetId, batch: ViewBatch },
    PartialUpdate { widget_id: WidgetId, batch: ViewBatch },
    RefreshCallback { request_code: WidgetId },
    Reload { widget_ids: Vec<WidgetId> },
}

/// What one widget currently displays.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedWidget {
    pub layout: Option<LayoutId>,
    pub text: BTreeMap<ViewId, String>,
    pub images: BTreeMap<ViewId, WidgetImage>,
    /// Request code each clickable element fires.
    pub clicks: BTreeMap<ViewId, WidgetId>,
}

impl RenderedWidget {
    fn apply(
        &mut self,
        batch: &ViewBatch,
        pending: &mut BTreeMap<WidgetId, CallbackDescriptor>,
    ) {
        self.layout = Some(batch.layout);
        for op in &batch.ops {
            match op {
                ViewOp::SetText { view, text } => {
                    self.text.insert(*view, text.clone());
                }
                ViewOp::SetImage { view, image } => {
                    self.images.insert(*view, image.clone());
                }
                ViewOp::SetClick { view, callback } => {
                    self.clicks.insert(*view, callback.request_code());
                    pending.insert(callback.request_code(), callback.clone());
                }
            }
        }
    }
}

/// Widget host backed by in-process collections.
#[derive(Debug, Clone)]
pub struct MemoryHost {
    package: String,
    /// Providers in registration order, each with its instances in
    /// placement order.
    providers: Vec<(ProviderHandle, Vec<WidgetId>)>,
    /// Elements present in every layout.
    elements: BTreeMap<String, ViewId>,
    /// Elements present only in one layout.
    layout_elements: BTreeMap<LayoutId, BTreeMap<String, ViewId>>,
    next_view: i32,
    launchable: BTreeMap<String, LaunchTarget>,
    rendered: BTreeMap<WidgetId, RenderedWidget>,
    pending: BTreeMap<WidgetId, CallbackDescriptor>,
    calls: Vec<HostCall>,
    fail_next: Option<String>,
}

impl MemoryHost {
    pub fn new(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            providers: Vec::new(),
            elements: BTreeMap::new(),
            layout_elements: BTreeMap::new(),
            next_view: FIRST_VIEW_ID,
            launchable: BTreeMap::new(),
            rendered: BTreeMap::new(),
            pending: BTreeMap::new(),
            calls: Vec::new(),
            fail_next: None,
        }
    }

    // -- Setup ----------------------------------------------------------------

    /// Declare a view element present in every layout and return its id.
    /// Declaring the same name twice returns the existing id.
    pub fn declare_element(&mut self, name: &str) -> ViewId {
        if let Some(view) = self.elements.get(name) {
            return *view;
        }
        let view = self.next_view_id();
        self.elements.insert(name.to_owned(), view);
        view
    }

    /// Declare a view element that only `layout` contains.
    pub fn declare_element_in(&mut self, layout: LayoutId, name: &str) -> ViewId {
        if let Some(view) = self
            .layout_elements
            .get(&layout)
            .and_then(|names| names.get(name))
        {
            return *view;
        }
        let view = self.next_view_id();
        self.layout_elements
            .entry(layout)
            .or_default()
            .insert(name.to_owned(), view);
        view
    }

    pub fn with_elements(mut self, names: &[&str]) -> Self {
        for name in names {
            self.declare_element(name);
        }
        self
    }

    /// Make `package` launchable through its default entry point.
    pub fn install_package(&mut self, package: &str) {
        self.launchable.insert(
            package.to_owned(),
            LaunchTarget {
                package: package.to_owned(),
                component: Some(format!("{package}.MainActivity")),
            },
        );
    }

    pub fn with_package(mut self, package: &str) -> Self {
        self.install_package(package);
        self
    }

    /// Place a new instance of `provider` on the host surface.
    pub fn place_widget(&mut self, provider: &ProviderHandle, widget_id: WidgetId) {
        let ids = self.instances_mut(provider);
        if !ids.contains(&widget_id) {
            ids.push(widget_id);
        }
    }

    /// List `widget_id` under `provider` again even if it is already
    /// there, as a host holding a stale registration reports it.
    pub fn place_duplicate(&mut self, provider: &ProviderHandle, widget_id: WidgetId) {
        self.instances_mut(provider).push(widget_id);
    }

    /// Remove an instance, as when the user deletes it from the home screen.
    pub fn remove_widget(&mut self, widget_id: WidgetId) {
        for (_, ids) in &mut self.providers {
            ids.retain(|id| *id != widget_id);
        }
        self.rendered.remove(&widget_id);
        self.pending.remove(&widget_id);
    }

    /// Make the next mutating call fail with `message`.
    pub fn fail_next_call(&mut self, message: impl Into<String>) {
        self.fail_next = Some(message.into());
    }

    // -- Inspection -----------------------------------------------------------

    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    pub fn rendered(&self, widget_id: WidgetId) -> Option<&RenderedWidget> {
        self.rendered.get(&widget_id)
    }

    /// The descriptor registered under `request_code`.
    pub fn pending_callback(&self, request_code: WidgetId) -> Option<&CallbackDescriptor> {
        self.pending.get(&request_code)
    }

    /// Text currently shown by the named element of a widget.
    pub fn text(&self, widget_id: WidgetId, element: &str) -> Option<&str> {
        let widget = self.rendered.get(&widget_id)?;
        let view = self.lookup(widget.layout?, element)?;
        widget.text.get(&view).map(String::as_str)
    }

    /// Simulate a click on the named element: the descriptor the host would
    /// fire, if one is attached.
    pub fn click(&self, widget_id: WidgetId, element: &str) -> Option<CallbackDescriptor> {
        let widget = self.rendered.get(&widget_id)?;
        let view = self.lookup(widget.layout?, element)?;
        let request_code = widget.clicks.get(&view)?;
        self.pending.get(request_code).cloned()
    }

    fn lookup(&self, layout: LayoutId, name: &str) -> Option<ViewId> {
        self.layout_elements
            .get(&layout)
            .and_then(|names| names.get(name))
            .or_else(|| self.elements.get(name))
            .copied()
    }

    fn next_view_id(&mut self) -> ViewId {
        let view = ViewId(self.next_view);
        self.next_view += 1;
        view
    }

    fn instances_mut(&mut self, provider: &ProviderHandle) -> &mut Vec<WidgetId> {
        let index = match self.providers.iter().position(|(p, _)| p == provider) {
            Some(index) => index,
            None => {
                self.providers.push((provider.clone(), Vec::new()));
                self.providers.len() - 1
            }
        };
        &mut self.providers[index].1
    }

    fn take_failure(&mut self) -> Result<()> {
        match self.fail_next.take() {
            Some(message) => Err(WidgetError::HostOperationFailed(message)),
            None => Ok(()),
        }
    }
}

impl WidgetHost for MemoryHost {
    fn platform_name(&self) -> &str {
        "Memory"
    }

    fn own_package(&self) -> &str {
        &self.package
    }

    fn widget_ids(&self, provider: &ProviderHandle) -> Result<Vec<WidgetId>> {
        Ok(self
            .providers
            .iter()
            .find(|(p, _)| p == provider)
            .map(|(_, ids)| ids.clone())
            .unwrap_or_default())
    }

    fn widget_exists(&self, widget_id: WidgetId) -> Result<bool> {
        Ok(self.providers.iter().any(|(_, ids)| ids.contains(&widget_id)))
    }

    fn resolve_view(&self, layout: LayoutId, name: &str) -> Result<Option<ViewId>> {
        Ok(self.lookup(layout, name))
    }

    fn launch_target(&self, package: &str) -> Result<Option<LaunchTarget>> {
        Ok(self.launchable.get(package).cloned())
    }

    fn update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()> {
        self.take_failure()?;
        let mut widget = RenderedWidget::default();
        widget.apply(batch, &mut self.pending);
        self.rendered.insert(widget_id, widget);
        self.calls.push(HostCall::Update {
            widget_id,
            batch: batch.clone(),
        });
        tracing::debug!(%widget_id, ops = batch.ops.len(), "memory host: full update");
        Ok(())
    }

    fn partially_update_widget(&mut self, widget_id: WidgetId, batch: &ViewBatch) -> Result<()> {
        self.take_failure()?;
        self.rendered
            .entry(widget_id)
            .or_default()
            .apply(batch, &mut self.pending);
        self.calls.push(HostCall::PartialUpdate {
            widget_id,
            batch: batch.clone(),
        });
        tracing::debug!(%widget_id, ops = batch.ops.len(), "memory host: partial update");
        Ok(())
    }

    fn refresh_callback(&mut self, descriptor: &CallbackDescriptor) -> Result<()> {
        self.take_failure()?;
        let request_code = descriptor.request_code();
        self.pending.insert(request_code, descriptor.clone());
        self.calls.push(HostCall::RefreshCallback { request_code });
        tracing::debug!(%request_code, "memory host: callback refreshed");
        Ok(())
    }

    fn broadcast_reload(&mut self, widget_ids: &[WidgetId]) -> Result<()> {
        self.take_failure()?;
        self.calls.push(HostCall::Reload {
            widget_ids: widget_ids.to_vec(),
        });
        tracing::debug!(count = widget_ids.len(), "memory host: reload broadcast");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use widgetlink_core::types::ClickCallback;

    use super::*;

    fn descriptor(payload: &str) -> CallbackDescriptor {
        CallbackDescriptor::new(
            "CLICK",
            &ClickCallback {
                widget_id: WidgetId(7),
                payload: Some(payload.into()),
                deep_link: None,
            },
            LaunchTarget {
                package: "com.example.app".into(),
                component: None,
            },
        )
    }

    fn provider() -> ProviderHandle {
        ProviderHandle {
            package: "com.example.app".into(),
            class_name: "com.example.app.ClockWidget".into(),
        }
    }

    #[test]
    fn widget_ids_in_placement_order() {
        let mut host = MemoryHost::new("com.example.app");
        host.place_widget(&provider(), WidgetId(9));
        host.place_widget(&provider(), WidgetId(3));
        host.place_widget(&provider(), WidgetId(9));

        let ids = host.widget_ids(&provider()).expect("widget_ids");
        assert_eq!(ids, vec![WidgetId(9), WidgetId(3)]);
    }

    #[test]
    fn unknown_provider_has_no_instances() {
        let host = MemoryHost::new("com.example.app");
        assert!(host.widget_ids(&provider()).expect("widget_ids").is_empty());
    }

    #[test]
    fn remove_widget_forgets_instance() {
        let mut host = MemoryHost::new("com.example.app");
        host.place_widget(&provider(), WidgetId(4));
        assert!(host.widget_exists(WidgetId(4)).expect("exists"));
        host.remove_widget(WidgetId(4));
        assert!(!host.widget_exists(WidgetId(4)).expect("exists"));
    }

    #[test]
    fn declare_element_is_stable() {
        let mut host = MemoryHost::new("com.example.app");
        let title = host.declare_element("title");
        let body = host.declare_element("body");
        assert_ne!(title, body);
        assert_eq!(host.declare_element("title"), title);
        assert_eq!(host.resolve_view(LayoutId(1), "body").expect("resolve"), Some(body));
        assert_eq!(host.resolve_view(LayoutId(1), "missing").expect("resolve"), None);
    }

    #[test]
    fn layout_elements_resolve_only_in_their_layout() {
        let mut host = MemoryHost::new("com.example.app").with_elements(&["title"]);
        let chart = host.declare_element_in(LayoutId(2), "chart");
        assert_eq!(host.declare_element_in(LayoutId(2), "chart"), chart);

        assert_eq!(host.resolve_view(LayoutId(2), "chart").expect("resolve"), Some(chart));
        assert_eq!(host.resolve_view(LayoutId(1), "chart").expect("resolve"), None);
        assert!(host.resolve_view(LayoutId(2), "title").expect("resolve").is_some());
    }

    #[test]
    fn duplicate_placement_is_reported_as_is() {
        let mut host = MemoryHost::new("com.example.app");
        host.place_widget(&provider(), WidgetId(9));
        host.place_duplicate(&provider(), WidgetId(9));
        let ids = host.widget_ids(&provider()).expect("widget_ids");
        assert_eq!(ids, vec![WidgetId(9), WidgetId(9)]);
    }

    #[test]
    fn readdressing_retargets_every_element() {
        let mut host = MemoryHost::new("com.example.app").with_elements(&["title", "body"]);
        let title = host.declare_element("title");
        let body = host.declare_element("body");

        let mut first = ViewBatch::new(LayoutId(1));
        first
            .set_text(title, "Hello")
            .set_click(title, descriptor("first"))
            .set_text(body, "World")
            .set_click(body, descriptor("first"));
        host.update_widget(WidgetId(7), &first).expect("update");

        let mut second = ViewBatch::new(LayoutId(1));
        second.set_text(title, "Bye").set_click(title, descriptor("second"));
        host.partially_update_widget(WidgetId(7), &second)
            .expect("partial update");

        for element in ["title", "body"] {
            let click = host.click(WidgetId(7), element).expect(element);
            assert_eq!(click.payload(), Some("second"), "{element}");
        }
    }

    #[test]
    fn refresh_replaces_registered_callback() {
        let mut host = MemoryHost::new("com.example.app").with_elements(&["title"]);
        let title = host.declare_element("title");
        let mut batch = ViewBatch::new(LayoutId(1));
        batch.set_click(title, descriptor("first"));
        host.update_widget(WidgetId(7), &batch).expect("update");

        host.refresh_callback(&descriptor("second")).expect("refresh");
        assert_eq!(
            host.click(WidgetId(7), "title").and_then(|d| d.payload().map(str::to_owned)),
            Some("second".to_owned())
        );
        assert_eq!(
            host.calls().last(),
            Some(&HostCall::RefreshCallback {
                request_code: WidgetId(7)
            })
        );
    }

    #[test]
    fn full_update_replaces_partial_update_merges() {
        let mut host = MemoryHost::new("com.example.app").with_elements(&["title", "body"]);
        let title = host.declare_element("title");
        let body = host.declare_element("body");

        let mut first = ViewBatch::new(LayoutId(1));
        first.set_text(title, "Hello").set_text(body, "World");
        host.update_widget(WidgetId(1), &first).expect("update");

        let mut partial = ViewBatch::new(LayoutId(1));
        partial.set_text(title, "Bye");
        host.partially_update_widget(WidgetId(1), &partial)
            .expect("partial update");
        assert_eq!(host.text(WidgetId(1), "title"), Some("Bye"));
        assert_eq!(host.text(WidgetId(1), "body"), Some("World"));

        let mut full = ViewBatch::new(LayoutId(1));
        full.set_text(title, "Only");
        host.update_widget(WidgetId(1), &full).expect("update");
        assert_eq!(host.text(WidgetId(1), "title"), Some("Only"));
        assert_eq!(host.text(WidgetId(1), "body"), None);
        assert_eq!(host.calls().len(), 3);
    }

    #[test]
    fn injected_failure_is_reported_once() {
        let mut host = MemoryHost::new("com.example.app");
        host.fail_next_call("binder died");
        let err = host
            .broadcast_reload(&[WidgetId(1)])
            .expect_err("must fail");
        assert_eq!(err.to_string(), "binder died");
        assert!(host.calls().is_empty());
        host.broadcast_reload(&[WidgetId(1)]).expect("second call");
        assert_eq!(host.calls().len(), 1);
    }
}

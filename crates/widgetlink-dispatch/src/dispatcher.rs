// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command dispatcher.
//
// Routes decoded commands onto the widget host, the intent builder and the
// configuration session. Every view element a call names is resolved before
// the first host mutation, so a failed call never leaves a partial update
// behind.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use widgetlink_bridge::descriptor::CallbackDescriptor;
use widgetlink_bridge::traits::{AppChannel, ConfigurationActivity, ViewBatch, WidgetHost};
use widgetlink_core::config::BridgeConfig;
use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{
    ClickCallback, ConfigureCallback, ConfigureOutcome, LayoutId, ProviderHandle, SessionId,
    ViewId, ViewUpdateRequest, WidgetId, WidgetImage,
};

use crate::image::decode_image;
use crate::intent::IntentBuilder;
use crate::lifecycle::LifecycleForwarder;
use crate::registry::ProviderRegistry;
use crate::reply::Reply;
use crate::request::{
    Command, ConfigureWidgetRequest, ProviderQuery, UpdateWidgetRequest, WidgetExistsRequest,
};
use crate::session::Attachment;

/// Owns the host, the attachment state and the live click descriptors.
pub struct Dispatcher<H: WidgetHost> {
    host: H,
    config: BridgeConfig,
    registry: ProviderRegistry,
    intents: IntentBuilder,
    attachment: Attachment,
}

/// A view update whose element names have all been resolved.
struct ResolvedUpdate {
    layout: LayoutId,
    text: Vec<(ViewId, String)>,
    image: Option<(ViewId, WidgetImage)>,
}

impl ResolvedUpdate {
    /// Lower into a host batch, attaching `descriptor` to every populated
    /// element. With `clear_first`, each text element is blanked before it
    /// is set.
    fn into_batch(self, descriptor: &CallbackDescriptor, clear_first: bool) -> ViewBatch {
        let mut batch = ViewBatch::new(self.layout);
        for (view, text) in self.text {
            if clear_first {
                batch.set_text(view, "");
            }
            batch.set_text(view, text).set_click(view, descriptor.clone());
        }
        if let Some((view, image)) = self.image {
            batch.set_image(view, image).set_click(view, descriptor.clone());
        }
        batch
    }
}

impl<H: WidgetHost> Dispatcher<H> {
    /// Create a dispatcher whose registry is built from `config`.
    pub fn new(host: H, config: BridgeConfig) -> Self {
        let registry = ProviderRegistry::from_config(&config);
        let intents = IntentBuilder::new(config.click_action.clone());
        info!(
            platform = host.platform_name(),
            package = %config.package_name,
            "widget dispatcher ready"
        );
        Self {
            host,
            config,
            registry,
            intents,
            attachment: Attachment::default(),
        }
    }

    /// Replace the registry built from the config.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn intents(&self) -> &IntentBuilder {
        &self.intents
    }

    // -- Attachment -----------------------------------------------------------

    pub fn attach(&mut self, channel: Box<dyn AppChannel>) {
        self.attachment.attach(channel);
    }

    pub fn detach(&mut self) {
        self.attachment.detach();
    }

    pub fn is_attached(&self) -> bool {
        self.attachment.is_attached()
    }

    /// Open a configuration session for the host's configure activity.
    pub fn begin_configuration(
        &mut self,
        activity: Box<dyn ConfigurationActivity>,
    ) -> Result<SessionId> {
        self.attachment.begin_configuration(activity)
    }

    pub fn has_configuration_session(&self) -> bool {
        self.attachment.session_id().is_ok()
    }

    // -- Lifecycle ------------------------------------------------------------

    /// Forwarder bound to the current attachment.
    pub fn lifecycle(&self) -> LifecycleForwarder<'_> {
        LifecycleForwarder::new(self.attachment.channel(), self.intents.action())
    }

    /// The host asks the app to configure a freshly placed widget.
    pub fn on_configure_requested(&self, callback: &ConfigureCallback) -> bool {
        self.lifecycle().configure_requested(callback)
    }

    /// A rendered widget view was clicked.
    pub fn on_widget_clicked(&self, descriptor: &CallbackDescriptor) -> bool {
        self.lifecycle().widget_clicked(descriptor)
    }

    // -- Dispatch -------------------------------------------------------------

    /// Decode and run one method call from the application layer.
    pub fn handle(&mut self, method: &str, arguments: Value) -> Reply {
        let command = match Command::decode(method, arguments) {
            Ok(Some(command)) => command,
            Ok(None) => {
                debug!(method, "method not implemented");
                return Reply::NotImplemented;
            }
            Err(e) => {
                warn!(method, code = e.code().as_i32(), error = %e, "arguments rejected");
                return e.into();
            }
        };

        debug!(method = command.method(), "dispatching");
        match self.execute(command) {
            Ok(value) => {
                info!(method, "command succeeded");
                Reply::success(value)
            }
            Err(e) => {
                warn!(method, code = e.code().as_i32(), error = %e, "command failed");
                e.into()
            }
        }
    }

    /// Run a decoded command, returning its success value.
    pub fn execute(&mut self, command: Command) -> Result<Value> {
        match command {
            Command::CancelConfigureWidget => self.cancel_configure_widget().map(Value::from),
            Command::ConfigureWidget(request) => self.configure_widget(request).map(Value::from),
            Command::GetWidgetIds(query) => {
                let ids = self.widget_ids(&query)?;
                Ok(Value::from(ids.into_iter().map(|id| id.0).collect::<Vec<_>>()))
            }
            Command::ReloadWidgets(query) => self.reload_widgets(&query).map(Value::from),
            Command::UpdateWidget(request) => self.update_widget(request).map(Value::from),
            Command::WidgetExists(request) => self.widget_exists(&request).map(Value::from),
        }
    }

    // -- Operations -----------------------------------------------------------

    /// Abandon the in-flight configuration. The host will not commit the
    /// widget.
    #[instrument(skip(self))]
    pub fn cancel_configure_widget(&mut self) -> Result<bool> {
        let session = self.attachment.take_session()?;
        session.complete(ConfigureOutcome::Cancelled)?;
        Ok(true)
    }

    /// First-time setup of a widget, ending the configuration session.
    #[instrument(
        skip(self, request),
        fields(widget_id = %request.widget_instance_id, layout_id = %request.layout_id)
    )]
    pub fn configure_widget(&mut self, request: ConfigureWidgetRequest) -> Result<bool> {
        if request.target_package_name.is_empty() {
            return Err(WidgetError::missing("targetPackageName"));
        }
        self.attachment.session_id()?;

        let target = self
            .host
            .launch_target(&request.target_package_name)?
            .ok_or_else(|| WidgetError::TargetNotFound(request.target_package_name.clone()))?;

        let image = match request.image.as_deref() {
            Some(encoded) => decode_image(encoded)?,
            None => None,
        };
        let update = ViewUpdateRequest {
            layout: request.layout_id,
            text: request.view_text.unwrap_or_default(),
            image,
        };
        let resolved = self.resolve(update)?;

        let widget_id = request.widget_instance_id;
        let descriptor = self.intents.build(
            &ClickCallback {
                widget_id,
                payload: request.payload,
                deep_link: request.deep_link,
            },
            target,
        )?;
        let batch = resolved.into_batch(&descriptor, false);
        self.host.update_widget(widget_id, &batch)?;
        self.intents.commit(descriptor);

        self.attachment
            .take_session()?
            .complete(ConfigureOutcome::Committed(widget_id))?;
        info!(%widget_id, ops = batch.ops.len(), "widget configured");
        Ok(true)
    }

    /// Live instance ids of a provider, in host order, without duplicates.
    #[instrument(skip(self), fields(provider = %query.provider_type_name))]
    pub fn widget_ids(&self, query: &ProviderQuery) -> Result<Vec<WidgetId>> {
        let provider = self.provider(query)?;
        let mut ids = self.host.widget_ids(provider)?;
        let mut seen = HashSet::new();
        ids.retain(|id| seen.insert(*id));
        debug!(count = ids.len(), "widget ids listed");
        Ok(ids)
    }

    /// Ask the host to run its own update lifecycle for every instance of a
    /// provider.
    #[instrument(skip(self), fields(provider = %query.provider_type_name))]
    pub fn reload_widgets(&mut self, query: &ProviderQuery) -> Result<bool> {
        let ids = self.widget_ids(query)?;
        self.host.broadcast_reload(&ids)?;
        info!(count = ids.len(), "reload broadcast sent");
        Ok(true)
    }

    /// In-place update of an already configured widget. Elements the
    /// request does not name are left untouched.
    #[instrument(
        skip(self, request),
        fields(widget_id = %request.widget_instance_id, layout_id = %request.layout_id)
    )]
    pub fn update_widget(&mut self, request: UpdateWidgetRequest) -> Result<bool> {
        let target = self.registry.activity(&self.config.launch_activity)?.clone();
        let update = ViewUpdateRequest {
            layout: request.layout_id,
            text: request.view_text.unwrap_or_default(),
            image: None,
        };
        let resolved = self.resolve(update)?;

        let widget_id = request.widget_instance_id;
        let descriptor = self.intents.build(
            &ClickCallback {
                widget_id,
                payload: request.payload,
                deep_link: request.deep_link,
            },
            target,
        )?;
        let batch = resolved.into_batch(&descriptor, self.config.clear_before_set);
        if batch.is_empty() {
            self.host.refresh_callback(&descriptor)?;
            self.intents.commit(descriptor);
            debug!("nothing to apply, descriptor refreshed only");
            return Ok(true);
        }
        self.host.partially_update_widget(widget_id, &batch)?;
        self.intents.commit(descriptor);
        info!(%widget_id, ops = batch.ops.len(), "widget updated");
        Ok(true)
    }

    /// Whether the host currently recognizes the widget. The live
    /// descriptor of a widget that has gone away is released.
    #[instrument(skip(self))]
    pub fn widget_exists(&mut self, request: &WidgetExistsRequest) -> Result<bool> {
        let Some(widget_id) = request.widget_instance_id else {
            return Ok(false);
        };
        let exists = self.host.widget_exists(widget_id)?;
        if !exists && self.intents.release(widget_id).is_some() {
            debug!(%widget_id, "released descriptor of removed widget");
        }
        Ok(exists)
    }

    // -- Helpers --------------------------------------------------------------

    fn provider(&self, query: &ProviderQuery) -> Result<&ProviderHandle> {
        let package = query
            .package
            .as_deref()
            .filter(|package| !package.is_empty())
            .unwrap_or_else(|| self.host.own_package());
        self.registry.provider(package, &query.provider_type_name)
    }

    fn resolve(&self, update: ViewUpdateRequest) -> Result<ResolvedUpdate> {
        let text = self.resolve_text(update.layout, update.text)?;
        let image = match update.image {
            Some(image) => Some((
                self.resolve_element(update.layout, &self.config.image_element)?,
                image,
            )),
            None => None,
        };
        Ok(ResolvedUpdate {
            layout: update.layout,
            text,
            image,
        })
    }

    fn resolve_text(
        &self,
        layout: LayoutId,
        text: BTreeMap<String, String>,
    ) -> Result<Vec<(ViewId, String)>> {
        text.into_iter()
            .map(|(name, value)| Ok((self.resolve_element(layout, &name)?, value)))
            .collect()
    }

    /// Resolve `name` among the elements of `layout`.
    fn resolve_element(&self, layout: LayoutId, name: &str) -> Result<ViewId> {
        self.host
            .resolve_view(layout, name)?
            .ok_or_else(|| WidgetError::ViewResolutionFailed(name.to_owned()))
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Intent builder: click descriptors keyed by widget id.
//
// Rebuilding for the same widget replaces the live descriptor instead of
// adding another one, so repeated configure/update cycles never accumulate
// addressable callbacks.

use std::collections::HashMap;

use tracing::debug;
use widgetlink_bridge::descriptor::CallbackDescriptor;
use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{ClickCallback, LaunchTarget, WidgetId};

/// Builds click descriptors and tracks the live one per widget.
#[derive(Debug, Clone)]
pub struct IntentBuilder {
    action: String,
    live: HashMap<WidgetId, CallbackDescriptor>,
}

impl IntentBuilder {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            live: HashMap::new(),
        }
    }

    /// Action tag stamped on every descriptor.
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Build the descriptor for `callback`, launching `target` on click.
    ///
    /// A deep link that is not an absolute URI is rejected. The descriptor
    /// is not live until it is passed to [`commit`](Self::commit).
    pub fn build(
        &self,
        callback: &ClickCallback,
        target: LaunchTarget,
    ) -> Result<CallbackDescriptor> {
        if let Some(link) = callback.deep_link.as_deref() {
            validate_deep_link(link)?;
        }
        Ok(CallbackDescriptor::new(&self.action, callback, target))
    }

    /// Make `descriptor` the live one for its widget, replacing any earlier
    /// descriptor. Call this only once the host holds the descriptor.
    pub fn commit(&mut self, descriptor: CallbackDescriptor) {
        let widget_id = descriptor.request_code();
        debug!(
            %widget_id,
            fingerprint = descriptor.fingerprint(),
            replaced = self.live.contains_key(&widget_id),
            "click descriptor committed"
        );
        self.live.insert(widget_id, descriptor);
    }

    /// The live descriptor for `widget_id`.
    pub fn live(&self, widget_id: WidgetId) -> Option<&CallbackDescriptor> {
        self.live.get(&widget_id)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Forget the descriptor of a widget that no longer exists.
    pub fn release(&mut self, widget_id: WidgetId) -> Option<CallbackDescriptor> {
        self.live.remove(&widget_id)
    }
}

/// Accept `scheme:rest` where the scheme is a letter followed by letters,
/// digits, `+`, `-` or `.`.
fn validate_deep_link(link: &str) -> Result<()> {
    let invalid = || WidgetError::InvalidArgument(format!("deepLink is not an absolute URI: {link}"));

    let (scheme, rest) = link.split_once(':').ok_or_else(invalid)?;
    let mut chars = scheme.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid_scheme = starts_with_letter
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid_scheme || rest.is_empty() || link.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    Ok(())
}

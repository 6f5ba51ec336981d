// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Host lifecycle events forwarded to the application layer.

use serde::Serialize;
use tracing::{debug, warn};
use widgetlink_bridge::descriptor::CallbackDescriptor;
use widgetlink_bridge::traits::AppChannel;
use widgetlink_core::types::{ClickEvent, ConfigureCallback};

pub const ON_CONFIGURE_WIDGET: &str = "onConfigureWidget";
pub const ON_CLICK_WIDGET: &str = "onClickWidget";

/// Translates the two inbound host events into outbound channel calls.
///
/// Each event returns whether it was consumed. Nothing is consumed while
/// detached, since there is nowhere to forward it.
pub struct LifecycleForwarder<'a> {
    channel: Option<&'a dyn AppChannel>,
    click_action: &'a str,
}

impl<'a> LifecycleForwarder<'a> {
    pub fn new(channel: Option<&'a dyn AppChannel>, click_action: &'a str) -> Self {
        Self {
            channel,
            click_action,
        }
    }

    /// Forward `(widgetInstanceId, layoutId, layoutName)` unchanged.
    pub fn configure_requested(&self, callback: &ConfigureCallback) -> bool {
        let Some(channel) = self.channel else {
            warn!(
                widget_id = %callback.widget_instance_id,
                "configure requested while detached, event dropped"
            );
            return false;
        };
        forward(channel, ON_CONFIGURE_WIDGET, callback)
    }

    /// Forward the payload of a widget click.
    ///
    /// While attached, a click is consumed whatever its payload, with one
    /// narrowing: descriptors carrying another action tag are not widget
    /// clicks, so they return `false` and are left for other receivers. A
    /// descriptor altered after it was built is consumed, but its payload is
    /// withheld.
    pub fn widget_clicked(&self, descriptor: &CallbackDescriptor) -> bool {
        if descriptor.action() != self.click_action {
            debug!(action = descriptor.action(), "not a widget click, ignored");
            return false;
        }
        let Some(channel) = self.channel else {
            warn!(
                widget_id = %descriptor.widget_id(),
                "widget clicked while detached, event dropped"
            );
            return false;
        };

        let payload = if descriptor.is_intact() {
            descriptor.payload().map(str::to_owned)
        } else {
            warn!(
                widget_id = %descriptor.widget_id(),
                "click descriptor does not match its fingerprint, payload withheld"
            );
            None
        };
        forward(channel, ON_CLICK_WIDGET, &ClickEvent { payload })
    }
}

/// Send one outbound call. A failing channel is logged; the event still
/// counts as consumed.
fn forward(channel: &dyn AppChannel, method: &str, arguments: &impl Serialize) -> bool {
    let arguments = match serde_json::to_value(arguments) {
        Ok(arguments) => arguments,
        Err(e) => {
            warn!(method, error = %e, "lifecycle arguments could not be encoded");
            return true;
        }
    };
    match channel.invoke(method, arguments) {
        Ok(()) => debug!(method, "lifecycle event forwarded"),
        Err(e) => warn!(method, error = %e, "application channel rejected lifecycle event"),
    }
    true
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use serde_json::{Value, json};
    use widgetlink_core::error::{Result, WidgetError};
    use widgetlink_core::types::{ClickCallback, LaunchTarget, LayoutId, WidgetId};

    use super::*;

    const ACTION: &str = "widgetlink.action.CLICK_WIDGET";

    #[derive(Default)]
    struct Recorder {
        calls: RefCell<Vec<(String, Value)>>,
        fail: bool,
    }

    impl AppChannel for Recorder {
        fn invoke(&self, method: &str, arguments: Value) -> Result<()> {
            self.calls.borrow_mut().push((method.to_owned(), arguments));
            if self.fail {
                return Err(WidgetError::HostOperationFailed("engine gone".into()));
            }
            Ok(())
        }
    }

    fn descriptor(action: &str, payload: Option<&str>) -> CallbackDescriptor {
        CallbackDescriptor::new(
            action,
            &ClickCallback {
                widget_id: WidgetId(7),
                payload: payload.map(str::to_owned),
                deep_link: None,
            },
            LaunchTarget {
                package: "com.example.app".into(),
                component: None,
            },
        )
    }

    #[test]
    fn configure_forwards_fields_unchanged() {
        let recorder = Recorder::default();
        let forwarder = LifecycleForwarder::new(Some(&recorder), ACTION);
        let consumed = forwarder.configure_requested(&ConfigureCallback {
            widget_instance_id: WidgetId(7),
            layout_id: LayoutId(42),
            layout_name: Some("widget_notes".into()),
        });
        assert!(consumed);
        assert_eq!(
            *recorder.calls.borrow(),
            vec![(
                ON_CONFIGURE_WIDGET.to_owned(),
                json!({ "widgetInstanceId": 7, "layoutId": 42, "layoutName": "widget_notes" })
            )]
        );
    }

    #[test]
    fn click_forwards_payload() {
        let recorder = Recorder::default();
        let forwarder = LifecycleForwarder::new(Some(&recorder), ACTION);
        assert!(forwarder.widget_clicked(&descriptor(ACTION, Some("note-7"))));
        assert_eq!(
            *recorder.calls.borrow(),
            vec![(ON_CLICK_WIDGET.to_owned(), json!({ "payload": "note-7" }))]
        );
    }

    #[test]
    fn other_action_is_not_consumed() {
        let recorder = Recorder::default();
        let forwarder = LifecycleForwarder::new(Some(&recorder), ACTION);
        assert!(!forwarder.widget_clicked(&descriptor("android.intent.action.MAIN", Some("x"))));
        assert!(recorder.calls.borrow().is_empty());
    }

    #[test]
    fn detached_events_are_not_consumed() {
        let forwarder = LifecycleForwarder::new(None, ACTION);
        assert!(!forwarder.widget_clicked(&descriptor(ACTION, Some("x"))));
        assert!(!forwarder.configure_requested(&ConfigureCallback {
            widget_instance_id: WidgetId(1),
            layout_id: LayoutId(1),
            layout_name: None,
        }));
    }

    #[test]
    fn tampered_descriptor_withholds_payload() {
        let mut wire = serde_json::to_value(descriptor(ACTION, Some("note-7"))).expect("serialize");
        wire["payload"] = json!("note-8");
        let tampered: CallbackDescriptor = serde_json::from_value(wire).expect("deserialize");
        assert!(!tampered.is_intact());

        let recorder = Recorder::default();
        let forwarder = LifecycleForwarder::new(Some(&recorder), ACTION);
        assert!(forwarder.widget_clicked(&tampered));
        assert_eq!(
            *recorder.calls.borrow(),
            vec![(ON_CLICK_WIDGET.to_owned(), json!({ "payload": null }))]
        );
    }

    #[test]
    fn channel_failure_still_consumes() {
        let recorder = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let forwarder = LifecycleForwarder::new(Some(&recorder), ACTION);
        assert!(forwarder.widget_clicked(&descriptor(ACTION, None)));
        assert_eq!(recorder.calls.borrow().len(), 1);
    }
}

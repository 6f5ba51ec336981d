// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reverse-callback descriptors.
//
// A descriptor is the addressable record a host fires when a rendered widget
// view is clicked. Its identity key (request code) is the widget id, so the
// host keeps at most one live descriptor per widget instance. Descriptors are
// immutable once built; the fingerprint lets the receiving side detect any
// change made in transit.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use widgetlink_core::types::{ClickCallback, LaunchTarget, WidgetId};

use crate::traits::LaunchFlags;

/// Extra key under which hosts deliver the widget id.
pub const EXTRA_WIDGET_ID: &str = "appWidgetId";

/// Extra key under which hosts deliver the opaque payload.
pub const EXTRA_PAYLOAD: &str = "widgetlink.payload";

/// Extra key under which hosts deliver the fingerprint.
pub const EXTRA_FINGERPRINT: &str = "widgetlink.fingerprint";

/// How the host treats a descriptor that is re-addressed or delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorFlags {
    /// Re-addressing the same request code replaces the live value.
    pub update_current: bool,
    /// The receiving side may not fill in or alter the delivered fields.
    pub immutable: bool,
}

impl DescriptorFlags {
    pub const REPLACE_IMMUTABLE: Self = Self {
        update_current: true,
        immutable: true,
    };
}

/// A re-deliverable click action bound to one widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackDescriptor {
    request_code: WidgetId,
    action: String,
    target: LaunchTarget,
    launch_flags: LaunchFlags,
    payload: Option<String>,
    deep_link: Option<String>,
    flags: DescriptorFlags,
    fingerprint: String,
}

impl CallbackDescriptor {
    /// Address `callback` to `target` under the given action tag.
    pub fn new(action: impl Into<String>, callback: &ClickCallback, target: LaunchTarget) -> Self {
        let mut descriptor = Self::unsigned(action, callback, target);
        descriptor.fingerprint = descriptor.compute_fingerprint();
        descriptor
    }

    /// Rebuild a descriptor from the parts a host delivered with a click.
    ///
    /// `fingerprint` is kept as delivered, so [`is_intact`](Self::is_intact)
    /// reports whether any other part changed in transit. Launch and
    /// delivery flags are the ones every descriptor is built with.
    pub fn delivered(
        action: impl Into<String>,
        callback: &ClickCallback,
        target: LaunchTarget,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            ..Self::unsigned(action, callback, target)
        }
    }

    fn unsigned(action: impl Into<String>, callback: &ClickCallback, target: LaunchTarget) -> Self {
        Self {
            request_code: callback.widget_id,
            action: action.into(),
            target,
            launch_flags: LaunchFlags {
                new_task: true,
                clear_task: true,
            },
            payload: callback.payload.clone(),
            deep_link: callback.deep_link.clone(),
            flags: DescriptorFlags::REPLACE_IMMUTABLE,
            fingerprint: String::new(),
        }
    }

    /// Identity key; always the widget id.
    pub fn request_code(&self) -> WidgetId {
        self.request_code
    }

    pub fn widget_id(&self) -> WidgetId {
        self.request_code
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn target(&self) -> &LaunchTarget {
        &self.target
    }

    pub fn launch_flags(&self) -> LaunchFlags {
        self.launch_flags
    }

    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    pub fn deep_link(&self) -> Option<&str> {
        self.deep_link.as_deref()
    }

    pub fn flags(&self) -> DescriptorFlags {
        self.flags
    }

    /// Lowercase hex SHA-256 over the addressed content.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Whether the content still matches the fingerprint it was built with.
    pub fn is_intact(&self) -> bool {
        self.compute_fingerprint() == self.fingerprint
    }

    fn compute_fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.request_code.0.to_be_bytes());
        for field in [
            Some(self.action.as_str()),
            Some(self.target.package.as_str()),
            self.target.component.as_deref(),
            self.payload.as_deref(),
            self.deep_link.as_deref(),
        ] {
            // Presence byte, then length-prefixed bytes, so that `None` and
            // `Some("")` hash differently and fields cannot run together.
            match field {
                Some(value) => {
                    hasher.update([1u8]);
                    hasher.update((value.len() as u64).to_be_bytes());
                    hasher.update(value.as_bytes());
                }
                None => hasher.update([0u8]),
            }
        }
        hasher.update([
            self.launch_flags.new_task as u8,
            self.launch_flags.clear_task as u8,
        ]);
        hex::encode(hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn callback(payload: Option<&str>) -> ClickCallback {
        ClickCallback {
            widget_id: WidgetId(7),
            payload: payload.map(str::to_owned),
            deep_link: Some("myapp://notes/7".into()),
        }
    }

    fn target() -> LaunchTarget {
        LaunchTarget {
            package: "com.example.app".into(),
            component: Some("com.example.app.MainActivity".into()),
        }
    }

    #[test]
    fn request_code_is_widget_id() {
        let descriptor = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        assert_eq!(descriptor.request_code(), WidgetId(7));
        assert_eq!(descriptor.payload(), Some("note-7"));
        assert_eq!(descriptor.deep_link(), Some("myapp://notes/7"));
        assert_eq!(descriptor.flags(), DescriptorFlags::REPLACE_IMMUTABLE);
        assert!(descriptor.launch_flags().new_task);
        assert!(descriptor.launch_flags().clear_task);
    }

    #[test]
    fn fresh_descriptor_is_intact() {
        let descriptor = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        assert!(descriptor.is_intact());
        assert_eq!(descriptor.fingerprint().len(), 64);
    }

    #[test]
    fn fingerprint_distinguishes_absent_and_empty_payload() {
        let absent = CallbackDescriptor::new("CLICK", &callback(None), target());
        let empty = CallbackDescriptor::new("CLICK", &callback(Some("")), target());
        assert_ne!(absent.fingerprint(), empty.fingerprint());
    }

    #[test]
    fn tampered_payload_is_detected() {
        let descriptor = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        let mut json = serde_json::to_value(&descriptor).expect("serialize");
        json["payload"] = serde_json::json!("note-8");
        let delivered: CallbackDescriptor = serde_json::from_value(json).expect("deserialize");
        assert!(!delivered.is_intact());
    }

    #[test]
    fn delivered_parts_rebuild_an_intact_descriptor() {
        let sent = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        let delivered = CallbackDescriptor::delivered(
            "CLICK",
            &callback(Some("note-7")),
            target(),
            sent.fingerprint(),
        );
        assert_eq!(delivered, sent);
        assert!(delivered.is_intact());
    }

    #[test]
    fn delivered_with_altered_payload_is_not_intact() {
        let sent = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        let delivered = CallbackDescriptor::delivered(
            "CLICK",
            &callback(Some("note-8")),
            target(),
            sent.fingerprint(),
        );
        assert_eq!(delivered.fingerprint(), sent.fingerprint());
        assert_eq!(delivered.payload(), Some("note-8"));
        assert!(!delivered.is_intact());
    }

    #[test]
    fn delivered_with_altered_target_is_not_intact() {
        let sent = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        let elsewhere = LaunchTarget {
            package: "com.example.other".into(),
            component: None,
        };
        let delivered = CallbackDescriptor::delivered(
            "CLICK",
            &callback(Some("note-7")),
            elsewhere,
            sent.fingerprint(),
        );
        assert!(!delivered.is_intact());
    }

    #[test]
    fn delivery_round_trip_preserves_integrity() {
        let descriptor = CallbackDescriptor::new("CLICK", &callback(Some("note-7")), target());
        let json = serde_json::to_string(&descriptor).expect("serialize");
        let delivered: CallbackDescriptor = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(delivered, descriptor);
        assert!(delivered.is_intact());
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bridge configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Settings supplied by the application layer at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
    /// The caller's own package. Used when a command omits `package` and as
    /// the namespace in which view elements are identified.
    pub package_name: String,
    /// Action tag carried by every widget click descriptor.
    pub click_action: String,
    /// View element that receives the optional image.
    pub image_element: String,
    /// Registry name of the activity opened by update-path clicks.
    pub launch_activity: String,
    /// Clear each text element before setting it on partial updates.
    pub clear_before_set: bool,
    /// Widget provider types known to the app.
    pub providers: Vec<ProviderEntry>,
    /// Activities click callbacks may target.
    pub activities: Vec<ActivityEntry>,
}

/// One widget provider registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderEntry {
    /// Defaults to [`BridgeConfig::package_name`].
    #[serde(default)]
    pub package: Option<String>,
    /// Symbolic name the app layer uses (`providerTypeName`).
    pub name: String,
    /// Defaults to `{package}.{name}`.
    #[serde(default)]
    pub class_name: Option<String>,
}

/// One launchable activity registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub name: String,
    #[serde(default)]
    pub package: Option<String>,
    #[serde(default)]
    pub class_name: Option<String>,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            package_name: "com.example.app".into(),
            click_action: "widgetlink.action.CLICK_WIDGET".into(),
            image_element: "widget_image".into(),
            launch_activity: "MainActivity".into(),
            clear_before_set: true,
            providers: Vec::new(),
            activities: Vec::new(),
        }
    }
}

impl BridgeConfig {
    /// Parse a JSON config document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load the config file at `path`, or defaults if there is none.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Provider and activity registry supplied by the application at startup.
//
// Symbolic names from the app layer are mapped to concrete host handles
// here, so nothing is resolved by constructing class names at runtime.

use std::collections::HashMap;

use tracing::debug;
use widgetlink_core::config::BridgeConfig;
use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{LaunchTarget, ProviderHandle};

/// Symbolic name to handle mapping for widget providers and activities.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    /// Keyed by (package, symbolic name).
    providers: HashMap<(String, String), ProviderHandle>,
    activities: HashMap<String, LaunchTarget>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry described by `config`.
    ///
    /// The configured launch activity is always registered, defaulting to
    /// `{packageName}.{launchActivity}` when the config does not list it.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let mut registry = Self::new();
        for entry in &config.providers {
            let package = entry.package.as_deref().unwrap_or(&config.package_name);
            registry.register_provider(package, &entry.name, entry.class_name.as_deref());
        }
        for entry in &config.activities {
            let package = entry.package.as_deref().unwrap_or(&config.package_name);
            registry.register_activity(
                &entry.name,
                LaunchTarget {
                    package: package.to_owned(),
                    component: Some(qualified(package, &entry.name, entry.class_name.as_deref())),
                },
            );
        }
        if !registry.activities.contains_key(&config.launch_activity) {
            registry.register_activity(
                &config.launch_activity,
                LaunchTarget {
                    package: config.package_name.clone(),
                    component: Some(qualified(&config.package_name, &config.launch_activity, None)),
                },
            );
        }
        debug!(
            providers = registry.providers.len(),
            activities = registry.activities.len(),
            "registry built"
        );
        registry
    }

    /// Register a widget provider. `class_name` defaults to
    /// `{package}.{name}`.
    pub fn register_provider(
        &mut self,
        package: &str,
        name: &str,
        class_name: Option<&str>,
    ) -> &mut Self {
        let handle = ProviderHandle {
            package: package.to_owned(),
            class_name: qualified(package, name, class_name),
        };
        self.providers
            .insert((package.to_owned(), name.to_owned()), handle);
        self
    }

    pub fn register_activity(&mut self, name: &str, target: LaunchTarget) -> &mut Self {
        self.activities.insert(name.to_owned(), target);
        self
    }

    /// Look up a provider by package and symbolic name.
    pub fn provider(&self, package: &str, name: &str) -> Result<&ProviderHandle> {
        if name.is_empty() {
            return Err(WidgetError::missing("providerTypeName"));
        }
        self.providers
            .get(&(package.to_owned(), name.to_owned()))
            .ok_or_else(|| WidgetError::ProviderNotFound(format!("{package}.{name}")))
    }

    /// Look up an activity by symbolic name.
    pub fn activity(&self, name: &str) -> Result<&LaunchTarget> {
        self.activities
            .get(name)
            .ok_or_else(|| WidgetError::TargetNotFound(name.to_owned()))
    }
}

fn qualified(package: &str, name: &str, class_name: Option<&str>) -> String {
    match class_name {
        Some(class_name) => class_name.to_owned(),
        None => format!("{package}.{name}"),
    }
}

// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shared fixtures for the dispatcher integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use widgetlink_bridge::{AppChannel, ConfigurationActivity, MemoryHost};
use widgetlink_core::config::ProviderEntry;
use widgetlink_core::error::Result;
use widgetlink_core::{BridgeConfig, ConfigureOutcome, ProviderHandle, WidgetId};
use widgetlink_dispatch::Dispatcher;

pub const APP: &str = "com.example.app";
pub const NOTES: &str = "com.example.notes";
pub const CLOCK: &str = "ClockWidget";

/// Install a fmt subscriber once per test binary. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_test_writer()
        .try_init();
}

/// Application channel that records every outbound call.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    pub calls: Rc<RefCell<Vec<(String, Value)>>>,
}

impl AppChannel for RecordingChannel {
    fn invoke(&self, method: &str, arguments: Value) -> Result<()> {
        self.calls.borrow_mut().push((method.to_owned(), arguments));
        Ok(())
    }
}

/// Configure activity that records the outcome and whether it finished.
#[derive(Clone, Default)]
pub struct RecordingActivity {
    pub outcomes: Rc<RefCell<Vec<ConfigureOutcome>>>,
    pub finished: Rc<RefCell<u32>>,
}

impl ConfigurationActivity for RecordingActivity {
    fn set_result(&mut self, outcome: ConfigureOutcome) -> Result<()> {
        self.outcomes.borrow_mut().push(outcome);
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        *self.finished.borrow_mut() += 1;
        Ok(())
    }
}

pub fn clock_provider() -> ProviderHandle {
    ProviderHandle {
        package: APP.into(),
        class_name: format!("{APP}.{CLOCK}"),
    }
}

pub fn config() -> BridgeConfig {
    BridgeConfig {
        package_name: APP.into(),
        providers: vec![ProviderEntry {
            package: None,
            name: CLOCK.into(),
            class_name: None,
        }],
        ..BridgeConfig::default()
    }
}

/// An attached dispatcher over a memory host with `title`, `body` and the
/// image element declared, and the notes app installed.
pub fn dispatcher() -> (Dispatcher<MemoryHost>, RecordingChannel) {
    init_tracing();
    let host = MemoryHost::new(APP)
        .with_elements(&["title", "body", "widget_image"])
        .with_package(NOTES);
    let mut dispatcher = Dispatcher::new(host, config());
    let channel = RecordingChannel::default();
    dispatcher.attach(Box::new(channel.clone()));
    (dispatcher, channel)
}

/// Open a configuration session as the host does when a widget is placed.
pub fn begin(dispatcher: &mut Dispatcher<MemoryHost>, widget_id: WidgetId) -> RecordingActivity {
    dispatcher
        .host_mut()
        .place_widget(&clock_provider(), widget_id);
    let activity = RecordingActivity::default();
    dispatcher
        .begin_configuration(Box::new(activity.clone()))
        .expect("begin configuration");
    activity
}

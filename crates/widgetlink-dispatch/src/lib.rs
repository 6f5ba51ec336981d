// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Widgetlink: command dispatch for native home-screen widgets.
//!
//! The application layer sends named method calls with a JSON argument map;
//! [`Dispatcher::handle`] decodes them into typed commands, drives the
//! widget host and answers with a [`Reply`]. Host lifecycle events travel
//! the other way through [`LifecycleForwarder`].

pub mod dispatcher;
pub mod image;
pub mod intent;
pub mod lifecycle;
pub mod registry;
pub mod reply;
pub mod request;
pub mod session;

pub use dispatcher::Dispatcher;
pub use intent::IntentBuilder;
pub use lifecycle::{LifecycleForwarder, ON_CLICK_WIDGET, ON_CONFIGURE_WIDGET};
pub use registry::ProviderRegistry;
pub use reply::Reply;
pub use request::Command;
pub use session::{Attachment, ConfigurationSession};

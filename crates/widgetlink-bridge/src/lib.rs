// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

//! Widgetlink: native widget host abstractions.
//!
//! Defines the seams between the command core and the platform: the widget
//! host, the outbound application channel, and the configuration activity.
//! Android is reached through JNI; every other target gets the in-memory host.

pub mod descriptor;
pub mod memory;
pub mod traits;

#[cfg(target_os = "android")]
pub mod android;

pub use descriptor::{CallbackDescriptor, DescriptorFlags};
pub use memory::{HostCall, MemoryHost, RenderedWidget};
pub use traits::{AppChannel, ConfigurationActivity, LaunchFlags, ViewBatch, ViewOp, WidgetHost};

use widgetlink_core::error::Result;

/// Returns the widget host for the target operating system.
///
/// `package` is only used by the in-memory host; Android reads the package
/// from the hosting context.
pub fn platform_host(package: &str) -> Result<Box<dyn WidgetHost>> {
    #[cfg(target_os = "android")]
    {
        let _ = package;
        Ok(Box::new(android::AndroidHost::new()?))
    }
    #[cfg(not(target_os = "android"))]
    {
        tracing::info!(package, "no native widget host on this platform, using memory host");
        Ok(Box::new(MemoryHost::new(package)))
    }
}

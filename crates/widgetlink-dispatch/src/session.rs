// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Attachment state and configuration sessions.
//
// The bridge is either detached from the application layer or attached to
// exactly one channel. While attached, at most one configuration session is
// active; it ends when configuration is committed or cancelled, or when the
// bridge detaches.

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use widgetlink_bridge::traits::{AppChannel, ConfigurationActivity};
use widgetlink_core::error::{Result, WidgetError};
use widgetlink_core::types::{ConfigureOutcome, SessionId};

/// One in-flight widget configuration.
pub struct ConfigurationSession {
    id: SessionId,
    opened_at: DateTime<Utc>,
    activity: Box<dyn ConfigurationActivity>,
}

impl ConfigurationSession {
    pub fn new(activity: Box<dyn ConfigurationActivity>) -> Self {
        Self {
            id: SessionId::new(),
            opened_at: Utc::now(),
            activity,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Report `outcome` to the host and close the activity. Consumes the
    /// session.
    pub fn complete(mut self, outcome: ConfigureOutcome) -> Result<()> {
        self.activity.set_result(outcome)?;
        self.activity.finish()?;
        let elapsed_ms = (Utc::now() - self.opened_at).num_milliseconds();
        info!(session = %self.id, ?outcome, elapsed_ms, "configuration session closed");
        Ok(())
    }
}

impl std::fmt::Debug for ConfigurationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationSession")
            .field("id", &self.id)
            .field("opened_at", &self.opened_at)
            .finish_non_exhaustive()
    }
}

/// Whether the bridge currently has an application layer to talk to.
#[derive(Default)]
pub enum Attachment {
    #[default]
    Detached,
    Attached {
        channel: Box<dyn AppChannel>,
        session: Option<ConfigurationSession>,
    },
}

impl Attachment {
    /// Attach to `channel`, replacing any previous attachment.
    pub fn attach(&mut self, channel: Box<dyn AppChannel>) {
        if self.is_attached() {
            warn!("re-attaching without detach, previous channel dropped");
        }
        *self = Self::Attached {
            channel,
            session: None,
        };
        info!("attached to application channel");
    }

    /// Detach from the application layer. Any active session is dropped.
    pub fn detach(&mut self) {
        if let Self::Attached {
            session: Some(session),
            ..
        } = self
        {
            warn!(session = %session.id(), "detached with a configuration session still open");
        }
        if self.is_attached() {
            info!("detached from application channel");
        }
        *self = Self::Detached;
    }

    pub fn is_attached(&self) -> bool {
        matches!(self, Self::Attached { .. })
    }

    pub fn channel(&self) -> Option<&dyn AppChannel> {
        match self {
            Self::Attached { channel, .. } => Some(channel.as_ref()),
            Self::Detached => None,
        }
    }

    /// Open a configuration session around the host's configure activity.
    pub fn begin_configuration(
        &mut self,
        activity: Box<dyn ConfigurationActivity>,
    ) -> Result<SessionId> {
        let Self::Attached { session, .. } = self else {
            return Err(WidgetError::PreconditionFailed(
                "Not attached to any application channel!".into(),
            ));
        };
        if let Some(previous) = session.as_ref() {
            warn!(session = %previous.id(), "configuration session superseded");
        }
        let next = ConfigurationSession::new(activity);
        let id = next.id();
        info!(session = %id, "configuration session opened");
        *session = Some(next);
        Ok(id)
    }

    /// Id of the active configuration session.
    pub fn session_id(&self) -> Result<SessionId> {
        match self {
            Self::Attached {
                session: Some(session),
                ..
            } => Ok(session.id()),
            _ => Err(no_session()),
        }
    }

    /// Remove and return the active configuration session.
    pub fn take_session(&mut self) -> Result<ConfigurationSession> {
        match self {
            Self::Attached { session, .. } => session.take().ok_or_else(no_session),
            Self::Detached => Err(no_session()),
        }
    }
}

fn no_session() -> WidgetError {
    WidgetError::PreconditionFailed("Not attached to any activity!".into())
}

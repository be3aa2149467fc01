use std::fmt::{Display, Formatter};

use crate::client::session::Identity;
use crate::models::{EntityKind, NotificationKind, RecordId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinanceError {
    /// A form or patch is missing a required field or carries an invalid value.
    Validation(String),
    /// The backend could not be reached, answered with a non-success status,
    /// sent a body that does not parse, or did not answer in time.
    RemoteUnavailable(String),
    NotFound { kind: EntityKind, id: RecordId },
    /// A response arrived for an identity that is no longer active.
    StaleIdentity { identity: Identity },
    NotAuthenticated,
}

impl FinanceError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable(message.into())
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::RemoteUnavailable(_) => "remote_unavailable",
            Self::NotFound { .. } => "not_found",
            Self::StaleIdentity { .. } => "stale_identity",
            Self::NotAuthenticated => "not_authenticated",
        }
    }

    /// The notification type this error is surfaced as. Stale responses are
    /// dropped silently.
    pub const fn notification_kind(&self) -> Option<NotificationKind> {
        match self {
            Self::Validation(_) | Self::RemoteUnavailable(_) => Some(NotificationKind::Error),
            Self::NotFound { .. } | Self::NotAuthenticated => Some(NotificationKind::Warning),
            Self::StaleIdentity { .. } => None,
        }
    }
}

impl Display for FinanceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(msg) => write!(f, "{msg}"),
            Self::RemoteUnavailable(msg) => write!(f, "backend unavailable: {msg}"),
            Self::NotFound { kind, id } => write!(f, "{} '{id}' not found", kind.singular()),
            Self::StaleIdentity { identity } => {
                write!(f, "discarded response for inactive identity {identity}")
            }
            Self::NotAuthenticated => write!(f, "sign in first"),
        }
    }
}

impl std::error::Error for FinanceError {}

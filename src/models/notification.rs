use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
    Expense,
    Income,
}

impl NotificationKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
            Self::Expense => "expense",
            Self::Income => "income",
        }
    }

    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "✅",
            Self::Warning => "⚠️",
            Self::Error => "❌",
            Self::Info => "ℹ️",
            Self::Expense => "💸",
            Self::Income => "💰",
        }
    }
}

/// `seq` grows with every notification pushed in a session and gives the display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub seq: u64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub message: String,
}

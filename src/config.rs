use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::client::notify::DEFAULT_CAP;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000/api";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./expense_tracker.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_base_url: String,
    /// Local SQLite database holding the last identity and theme.
    pub database_url: String,
    /// Upper bound on any single remote call.
    pub request_timeout: Duration,
    /// `None` keeps every notification.
    pub notification_cap: Option<usize>,
    pub currency: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            notification_cap: Some(DEFAULT_CAP),
            currency: "₹".to_string(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("FINANCE_API_URL") {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            config.database_url = url;
        }
        if let Some(raw) = lookup("FINANCE_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().with_context(|| {
                format!("FINANCE_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}")
            })?;
            config.request_timeout = Duration::from_secs(secs.max(1));
        }
        if let Some(raw) = lookup("FINANCE_NOTIFICATION_CAP") {
            let cap: usize = raw
                .trim()
                .parse()
                .with_context(|| format!("FINANCE_NOTIFICATION_CAP must be a number, got {raw:?}"))?;
            config.notification_cap = (cap > 0).then_some(cap);
        }
        if let Some(symbol) = lookup("FINANCE_CURRENCY") {
            config.currency = symbol;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ClientConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.notification_cap, Some(DEFAULT_CAP));
    }

    #[test]
    fn overrides_are_read() {
        let config = config_from(&[
            ("FINANCE_API_URL", "https://budget.example/api"),
            ("FINANCE_REQUEST_TIMEOUT_SECS", "3"),
            ("FINANCE_NOTIFICATION_CAP", "0"),
            ("FINANCE_CURRENCY", "$"),
        ])
        .unwrap();
        assert_eq!(config.api_base_url, "https://budget.example/api");
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.notification_cap, None);
        assert_eq!(config.currency, "$");
    }

    #[test]
    fn malformed_numbers_are_errors() {
        let err = config_from(&[("FINANCE_REQUEST_TIMEOUT_SECS", "soon")]).unwrap_err();
        assert!(err.to_string().contains("FINANCE_REQUEST_TIMEOUT_SECS"));
    }
}

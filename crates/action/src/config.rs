//! Client configuration shared by every integration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Outbound HTTP configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// `User-Agent` sent on every request
    pub user_agent: String,

    /// Base URL overrides keyed by vendor (`"uber"`, `"typeform"`, ...).
    ///
    /// Used for sandbox hosts and for pointing an integration at a local
    /// mock server.
    pub base_urls: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: concat!("nebula-integrations/", env!("CARGO_PKG_VERSION")).to_string(),
            base_urls: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Known vendors whose base URL may be overridden from the environment.
    pub const VENDORS: &'static [&'static str] = &[
        "aws",
        "bigquery",
        "bitly",
        "humanitix",
        "microsoft_excel",
        "tiktok",
        "typeform",
        "uber",
        "whatsapp",
    ];

    /// Create configuration from environment variables
    ///
    /// Reads `NEBULA_HTTP_TIMEOUT_SECS`, `NEBULA_HTTP_USER_AGENT` and one
    /// `<VENDOR>_API_BASE_URL` per entry in [`Self::VENDORS`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(timeout) = lookup("NEBULA_HTTP_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            config.timeout_secs = timeout;
        }
        if let Some(agent) = lookup("NEBULA_HTTP_USER_AGENT").filter(|v| !v.is_empty()) {
            config.user_agent = agent;
        }
        for vendor in Self::VENDORS {
            let key = format!("{}_API_BASE_URL", vendor.to_ascii_uppercase());
            if let Some(url) = lookup(&key).filter(|v| !v.is_empty()) {
                config.base_urls.insert((*vendor).to_string(), url);
            }
        }

        config
    }

    /// Override the base URL for one vendor.
    pub fn with_base_url(mut self, vendor: impl Into<String>, url: impl Into<String>) -> Self {
        self.base_urls.insert(vendor.into(), url.into());
        self
    }

    /// Resolve a vendor's base URL, trimming any trailing slash.
    pub fn base_url(&self, vendor: &str, default: &str) -> String {
        self.base_urls
            .get(vendor)
            .map_or(default, String::as_str)
            .trim_end_matches('/')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert!(config.user_agent.starts_with("nebula-integrations/"));
        assert_eq!(config.base_url("uber", "https://api.uber.com"), "https://api.uber.com");
    }

    #[test]
    fn reads_overrides_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("NEBULA_HTTP_TIMEOUT_SECS", "5"),
            ("UBER_API_BASE_URL", "https://sandbox-api.uber.com/"),
            ("TYPEFORM_API_BASE_URL", ""),
        ]
        .into_iter()
        .collect();

        let config = ClientConfig::from_lookup(|k| env.get(k).map(|v| (*v).to_string()));

        assert_eq!(config.timeout_secs, 5);
        assert_eq!(
            config.base_url("uber", "https://api.uber.com"),
            "https://sandbox-api.uber.com"
        );
        assert_eq!(
            config.base_url("typeform", "https://api.typeform.com"),
            "https://api.typeform.com"
        );
    }

    #[test]
    fn deserializes_partial_document() {
        let config: ClientConfig =
            serde_json::from_value(serde_json::json!({"timeout_secs": 10})).unwrap();
        assert_eq!(config.timeout_secs, 10);
        assert!(config.base_urls.is_empty());
    }
}

//! Troubleshooting information for network-class failures.

use serde::Serialize;
use time::OffsetDateTime;
use url::Url;

use crate::connection::ConnectionState;
use crate::session::SessionId;

/// Environment variables that silently reroute HTTP traffic.
const PROXY_VARS: &[&str] = &[
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "ALL_PROXY",
    "http_proxy",
    "https_proxy",
    "all_proxy",
];

/// Detects things in the client's environment that may interfere with requests.
pub trait InterferenceProbe: Send + Sync {
    /// Returns a human-readable name for each suspect found.
    fn suspects(&self) -> Vec<String>;
}

/// A probe that never finds anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInterference;

impl InterferenceProbe for NoInterference {
    fn suspects(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Reports HTTP proxy settings found in the environment.
#[derive(Clone, Debug, Default)]
pub struct ProxyEnvProbe {
    overrides: Option<Vec<(String, String)>>,
}

impl ProxyEnvProbe {
    /// Probes the process environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Probes a fixed set of variables instead of the process environment.
    pub fn with_vars(vars: Vec<(String, String)>) -> Self {
        Self {
            overrides: Some(vars),
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.overrides {
            Some(vars) => vars.iter().find(|(k, _)| k == name).map(|(_, v)| v.clone()),
            None => std::env::var(name).ok(),
        }
    }
}

impl InterferenceProbe for ProxyEnvProbe {
    fn suspects(&self) -> Vec<String> {
        PROXY_VARS
            .iter()
            .filter_map(|name| {
                let value = self.lookup(name).filter(|v| !v.trim().is_empty())?;
                Some(match without_credentials(&value) {
                    Some(shown) => format!("{name}={shown}"),
                    None => name.to_string(),
                })
            })
            .collect()
    }
}

/// The proxy setting with any userinfo removed, or `None` if it cannot be shown safely.
fn without_credentials(value: &str) -> Option<String> {
    let value = value.trim();
    if !value.contains('@') {
        return Some(value.to_string());
    }
    let mut url = Url::parse(value).ok()?;
    if !url.has_host() {
        return None;
    }
    url.set_username("").ok()?;
    url.set_password(None).ok()?;
    Some(url.to_string())
}

/// A snapshot of the client's state for troubleshooting.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticInfo {
    pub session_id: SessionId,
    pub connection_status: ConnectionState,
    pub last_error: Option<String>,
    pub user_agent: String,
    #[serde(with = "crate::utils::time")]
    pub timestamp: OffsetDateTime,
    pub interference: Vec<String>,
}

use crate::foundation::error::{AvStudioError, AvStudioResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// API path prefix used by the service front end.
pub const DEFAULT_API_PREFIX: &str = "front/api/v1t";

/// Default HTTP request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Connection settings for [`crate::HttpTransport`].
///
/// Sources are layered, later wins: built-in defaults, a JSON file ([`ApiConfig::from_path`]),
/// `AVSTUDIO_*` environment variables ([`ApiConfig::apply_env`]), explicit overrides (CLI flags).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// Service origin, e.g. `https://studio.example.com`.
    pub base_url: String,
    /// Path prefix between the origin and API routes.
    pub api_prefix: String,
    /// Bearer token sent as `Authorization`.
    pub token: Option<String>,
    /// Team id sent as `X-Team-ID` on team-scoped calls.
    pub team: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_prefix: DEFAULT_API_PREFIX.to_owned(),
            token: None,
            team: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Config for `base_url` with defaults for everything else.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Load a JSON config file. Missing keys keep their defaults.
    pub fn from_path(path: impl AsRef<Path>) -> AvStudioResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AvStudioError::config(format!("open config '{}': {e}", path.display()))
        })?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            AvStudioError::config(format!("parse config '{}': {e}", path.display()))
        })
    }

    /// Overlay values from the process environment.
    pub fn with_env(self) -> AvStudioResult<Self> {
        self.apply_env(|key| std::env::var(key).ok())
    }

    /// Overlay `AVSTUDIO_BASE_URL`, `AVSTUDIO_API_PREFIX`, `AVSTUDIO_TOKEN`, `AVSTUDIO_TEAM` and
    /// `AVSTUDIO_TIMEOUT_SECS` as returned by `lookup`. Empty values are ignored.
    pub fn apply_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> AvStudioResult<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("AVSTUDIO_BASE_URL") {
            self.base_url = v;
        }
        if let Some(v) = get("AVSTUDIO_API_PREFIX") {
            self.api_prefix = v;
        }
        if let Some(v) = get("AVSTUDIO_TOKEN") {
            self.token = Some(v);
        }
        if let Some(v) = get("AVSTUDIO_TEAM") {
            self.team = Some(v);
        }
        if let Some(v) = get("AVSTUDIO_TIMEOUT_SECS") {
            self.timeout_secs = v.trim().parse().map_err(|e| {
                AvStudioError::config(format!("AVSTUDIO_TIMEOUT_SECS=\"{v}\": {e}"))
            })?;
        }
        Ok(self)
    }

    /// Check that the config can be used to reach the service.
    pub fn validate(&self) -> AvStudioResult<()> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(AvStudioError::config(
                "base_url is not set (config file, AVSTUDIO_BASE_URL or --base-url)",
            ));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(AvStudioError::config(format!(
                "base_url must start with http:// or https://, got \"{base}\""
            )));
        }
        if self.timeout_secs == 0 {
            return Err(AvStudioError::config("timeout_secs must be > 0"));
        }
        Ok(())
    }

    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Absolute URL of an API route (`path` is relative to the API prefix).
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let prefix = self.api_prefix.trim_matches('/');
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            format!("{base}/{path}")
        } else {
            format!("{base}/{prefix}/{path}")
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;

use crate::client::transport::Transport;
use crate::config::ApiConfig;
use crate::foundation::error::{AvStudioError, AvStudioResult};
use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, RANGE};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Header carrying the team scope of a request.
pub const TEAM_HEADER: &str = "X-Team-ID";

/// Longest response body excerpt kept in error messages.
const ERROR_BODY_LIMIT: usize = 512;

/// Blocking HTTP implementation of [`Transport`].
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    config: ApiConfig,
}

impl HttpTransport {
    /// Build a transport for a validated config.
    pub fn new(config: ApiConfig) -> AvStudioResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AvStudioError::transport(format!("create HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// The config this transport was built with.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Headers sent with every request; the team header only when `team_scoped`.
    pub(crate) fn headers(&self, team_scoped: bool) -> AvStudioResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &self.config.token {
            let v = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| AvStudioError::config(format!("token is not a valid header: {e}")))?;
            headers.insert(AUTHORIZATION, v);
        }
        if team_scoped {
            if let Some(team) = &self.config.team {
                let v = HeaderValue::from_str(team).map_err(|e| {
                    AvStudioError::config(format!("team is not a valid header: {e}"))
                })?;
                headers.insert(TEAM_HEADER, v);
            }
        }
        Ok(headers)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        team_scoped: bool,
    ) -> AvStudioResult<RequestBuilder> {
        let url = self.config.url_for(path);
        Ok(self
            .client
            .request(method, url)
            .headers(self.headers(team_scoped)?))
    }

    fn send(&self, rb: RequestBuilder, what: &str) -> AvStudioResult<Response> {
        let resp = rb
            .send()
            .map_err(|e| AvStudioError::transport(format!("{what}: {e}")))?;
        let status = resp.status();
        tracing::debug!(%status, what, "response");
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().unwrap_or_default();
        let excerpt: String = body.chars().take(ERROR_BODY_LIMIT).collect();
        Err(AvStudioError::http_status(
            status.as_u16(),
            format!("{what}: {}", excerpt.trim()),
        ))
    }

    fn send_json(&self, rb: RequestBuilder, what: &str) -> AvStudioResult<serde_json::Value> {
        let resp = self.send(rb, what)?;
        let text = resp
            .text()
            .map_err(|e| AvStudioError::transport(format!("{what}: read body: {e}")))?;
        decode_body(&text).map_err(|e| AvStudioError::transport(format!("{what}: {e}")))
    }

    fn with_body(rb: RequestBuilder, body: &serde_json::Value) -> RequestBuilder {
        if body.is_null() { rb } else { rb.json(body) }
    }
}

/// Decode a response body; blank bodies are `null`.
pub(crate) fn decode_body(text: &str) -> Result<serde_json::Value, serde_json::Error> {
    if text.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(text)
}

impl Transport for HttpTransport {
    #[tracing::instrument(level = "debug", skip(self))]
    fn get(&self, path: &str) -> AvStudioResult<serde_json::Value> {
        let rb = self.request(Method::GET, path, true)?;
        self.send_json(rb, &format!("GET {path}"))
    }

    #[tracing::instrument(level = "debug", skip(self, body))]
    fn post(&self, path: &str, body: &serde_json::Value) -> AvStudioResult<serde_json::Value> {
        let rb = Self::with_body(self.request(Method::POST, path, true)?, body);
        self.send_json(rb, &format!("POST {path}"))
    }

    #[tracing::instrument(level = "debug", skip(self, body))]
    fn put(&self, path: &str, body: &serde_json::Value) -> AvStudioResult<serde_json::Value> {
        let rb = Self::with_body(self.request(Method::PUT, path, true)?, body);
        self.send_json(rb, &format!("PUT {path}"))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn delete(&self, path: &str) -> AvStudioResult<serde_json::Value> {
        let rb = self.request(Method::DELETE, path, true)?;
        self.send_json(rb, &format!("DELETE {path}"))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn download_to_file(&self, path: &str, local_path: &Path) -> AvStudioResult<()> {
        let what = format!("GET {path}");
        let mut resp = self.send(self.request(Method::GET, path, true)?, &what)?;

        if let Some(parent) = local_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                AvStudioError::transport(format!("create dir '{}': {e}", parent.display()))
            })?;
        }
        let f = File::create(local_path).map_err(|e| {
            AvStudioError::transport(format!("create '{}': {e}", local_path.display()))
        })?;
        let mut w = BufWriter::new(f);
        let bytes = resp
            .copy_to(&mut w)
            .map_err(|e| AvStudioError::transport(format!("{what}: write body: {e}")))?;
        w.into_inner().map_err(|e| {
            AvStudioError::transport(format!("flush '{}': {}", local_path.display(), e.error()))
        })?;

        tracing::info!(bytes, path = %local_path.display(), "downloaded");
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn get_public(&self, path: &str) -> AvStudioResult<serde_json::Value> {
        let rb = self.request(Method::GET, path, false)?;
        self.send_json(rb, &format!("GET {path}"))
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn probe_public(&self, path: &str, byte_range: Option<(u64, u64)>) -> AvStudioResult<u16> {
        let mut rb = self.request(Method::GET, path, false)?;
        if let Some((first, last)) = byte_range {
            rb = rb.header(RANGE, format!("bytes={first}-{last}"));
        }
        let resp = self.send(rb, &format!("GET {path}"))?;
        Ok(resp.status().as_u16())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/client/http.rs"]
mod tests;

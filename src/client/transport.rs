use crate::foundation::error::AvStudioResult;
use std::path::Path;

/// JSON channel to the service.
///
/// Paths are relative to the API prefix (e.g. `"scenes/abc"`). Implementations fail with
/// [`crate::AvStudioError::Transport`] on non-2xx responses and decode empty bodies to
/// [`serde_json::Value::Null`].
pub trait Transport {
    /// `GET path`.
    fn get(&self, path: &str) -> AvStudioResult<serde_json::Value>;

    /// `POST path` with a JSON body; `Value::Null` sends no body.
    fn post(&self, path: &str, body: &serde_json::Value) -> AvStudioResult<serde_json::Value>;

    /// `PUT path` with a JSON body.
    fn put(&self, path: &str, body: &serde_json::Value) -> AvStudioResult<serde_json::Value>;

    /// `DELETE path`.
    fn delete(&self, path: &str) -> AvStudioResult<serde_json::Value>;

    /// `GET path` and write the raw response body to `local_path`.
    fn download_to_file(&self, path: &str, local_path: &Path) -> AvStudioResult<()>;

    /// `GET path` outside the team scope (no team header) and return the JSON body.
    fn get_public(&self, path: &str) -> AvStudioResult<serde_json::Value>;

    /// `GET path` outside the team scope, optionally limited to an inclusive byte range, and
    /// return the HTTP status. The body is discarded.
    fn probe_public(&self, path: &str, byte_range: Option<(u64, u64)>) -> AvStudioResult<u16>;
}

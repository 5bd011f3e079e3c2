//! Service clients over a [`Transport`].

/// Blocking HTTP transport.
pub mod http;
/// Render tasks, thumbnails, rendered files and sharing.
pub mod rendering;
/// Scene persistence.
pub mod scenes;
/// Transport trait.
pub mod transport;

pub use transport::Transport;

use crate::foundation::error::{AvStudioError, AvStudioResult};
use crate::scene::composition::Scene;

/// Id of a scene that has been saved to the service.
pub(crate) fn saved_id(scene: &Scene) -> AvStudioResult<&str> {
    scene.id().ok_or_else(|| {
        AvStudioError::validation(format!(
            "scene \"{}\" has no id; save it to the service first",
            scene.name()
        ))
    })
}

/// Interpret a response as a JSON array.
pub(crate) fn expect_array(
    value: serde_json::Value,
    what: &str,
) -> AvStudioResult<Vec<serde_json::Value>> {
    match value {
        serde_json::Value::Array(items) => Ok(items),
        // The service answers an empty collection with an empty body.
        serde_json::Value::Null => Ok(Vec::new()),
        other => Err(AvStudioError::schema(format!(
            "{what}: expected an array, got {}",
            kind_of(&other)
        ))),
    }
}

/// Read a string field of a response object.
pub(crate) fn expect_str<'v>(
    value: &'v serde_json::Value,
    key: &str,
    what: &str,
) -> AvStudioResult<&'v str> {
    value
        .get(key)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| AvStudioError::schema(format!("{what}: missing string field \"{key}\"")))
}

/// Decode a typed response item.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> AvStudioResult<T> {
    serde_json::from_value(value).map_err(|e| AvStudioError::schema(format!("{what}: {e}")))
}

fn kind_of(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

//! Scene wire-schema versioning, JSON paths for error reporting, and model validation.

pub(crate) mod validate;
pub(crate) mod version;

pub use validate::SchemaIssue;
pub use version::SCENE_API_VERSION;

//! AVStudio client SDK.
//!
//! The core is the [`Scene`] / [`Shot`] model and its JSON mapping (scene API version
//! [`SCENE_API_VERSION`]). On top of it sit thin service clients:
//!
//! - Build, edit and validate a [`Scene`]
//! - Persist it through [`Scenes`]
//! - Render it and fetch results through [`Rendering`]
//!
//! Both clients talk to the service through a [`Transport`]; [`HttpTransport`] is the blocking
//! HTTP implementation configured by an [`ApiConfig`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod foundation;

/// Service clients and their transport.
pub mod client;
/// Service connection settings.
pub mod config;
/// Scene and shot model.
pub mod scene;
/// Scene validation and schema version.
pub mod schema;

pub use crate::foundation::core::{AspectRatio, AssetId, SceneId, SourceId, SourceKind, TimeRange};
pub use crate::foundation::error::{AvStudioError, AvStudioResult};

pub use crate::client::http::HttpTransport;
pub use crate::client::rendering::{
    FrameSize, PollOptions, RenderOptions, RenderTask, RenderedFile, Rendering, ThumbnailRequest,
};
pub use crate::client::scenes::Scenes;
pub use crate::client::transport::Transport;
pub use crate::config::ApiConfig;
pub use crate::scene::SourceRef;
pub use crate::scene::composition::{Scene, derive_view_range};
pub use crate::scene::load::{EffectsOnLoad, LoadOptions};
pub use crate::scene::shot::{Background, BackgroundImage, Shot, VideoEffect};
pub use crate::schema::{SCENE_API_VERSION, SchemaIssue};

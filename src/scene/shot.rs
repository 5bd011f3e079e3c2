use crate::foundation::core::{AssetId, SourceId};
use crate::foundation::error::{AvStudioError, AvStudioResult};
use crate::scene::load::{EffectsOnLoad, LoadOptions};
use crate::scene::wire::{self, ShotDef};
use crate::schema::validate::SchemaPathElem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Layout used by shots that do not name one.
pub const DEFAULT_LAYOUT: &str = "single";

/// Brightness/contrast adjustment applied to one video source of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoEffect {
    /// Brightness offset.
    #[serde(rename = "Brightness")]
    pub brightness: f64,
    /// Contrast offset.
    #[serde(rename = "Contrast")]
    pub contrast: f64,
}

impl VideoEffect {
    /// Return `true` when the effect changes nothing.
    pub fn is_noop(self) -> bool {
        self.brightness == 0.0 && self.contrast == 0.0
    }
}

/// Catalog image used as a shot background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackgroundImage {
    /// Asset id.
    #[serde(rename = "ID")]
    pub id: AssetId,
    /// Asset display name.
    #[serde(rename = "Name")]
    pub name: String,
}

/// Shot background, serialized as `{"Type": "Image", "Image": {...}}` or
/// `{"Type": "Color", "Color": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Type")]
pub enum Background {
    /// Image from the asset catalog.
    Image {
        /// The referenced image.
        #[serde(rename = "Image")]
        image: BackgroundImage,
    },
    /// Solid color. The value is passed through to the service untouched.
    Color {
        /// Color value as understood by the service (usually a `#rrggbb` string).
        #[serde(rename = "Color")]
        color: serde_json::Value,
    },
}

/// One timeline entry of a [`crate::Scene`].
#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    timestamp: Option<f64>,
    layout: String,
    video_sources: Vec<SourceId>,
    audio_sources: Vec<SourceId>,
    video_effects: BTreeMap<usize, VideoEffect>,
    background: Option<Background>,
    skipped: bool,
}

impl Default for Shot {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Shot {
    /// Create an empty shot with the default layout.
    pub fn new(timestamp: Option<f64>) -> Self {
        Self {
            timestamp,
            layout: DEFAULT_LAYOUT.to_owned(),
            video_sources: Vec::new(),
            audio_sources: Vec::new(),
            video_effects: BTreeMap::new(),
            background: None,
            skipped: false,
        }
    }

    /// Create a shot referencing the given sources.
    pub fn with_sources(
        timestamp: Option<f64>,
        video_sources: Vec<SourceId>,
        audio_sources: Vec<SourceId>,
    ) -> Self {
        Self {
            video_sources,
            audio_sources,
            ..Self::new(timestamp)
        }
    }

    /// Timeline position, `None` until set.
    pub fn timestamp(&self) -> Option<f64> {
        self.timestamp
    }

    /// Move the shot on the timeline.
    ///
    /// A shot owned by a scene is not re-sorted automatically; call [`crate::Scene::resort`].
    pub fn set_timestamp(&mut self, timestamp: Option<f64>) {
        self.timestamp = timestamp;
    }

    /// Layout identifier.
    pub fn layout(&self) -> &str {
        &self.layout
    }

    /// Replace the layout identifier.
    pub fn set_layout(&mut self, layout: impl Into<String>) {
        self.layout = layout.into();
    }

    /// Video sources in on-screen order.
    pub fn video_sources(&self) -> &[SourceId] {
        &self.video_sources
    }

    /// Replace the video sources. Existing effects stay keyed by position.
    pub fn set_video_sources(&mut self, ids: Vec<SourceId>) {
        self.video_sources = ids;
    }

    /// Audio sources.
    pub fn audio_sources(&self) -> &[SourceId] {
        &self.audio_sources
    }

    /// Replace the audio sources.
    pub fn set_audio_sources(&mut self, ids: Vec<SourceId>) {
        self.audio_sources = ids;
    }

    /// Whether the shot is excluded from rendering.
    pub fn skipped(&self) -> bool {
        self.skipped
    }

    /// Exclude or include the shot in rendering.
    pub fn set_skipped(&mut self, skipped: bool) {
        self.skipped = skipped;
    }

    /// Sparse effect map keyed by video source position.
    pub fn video_effects(&self) -> &BTreeMap<usize, VideoEffect> {
        &self.video_effects
    }

    /// Effect applied to the video source at `position`, if any.
    pub fn video_effect(&self, position: usize) -> Option<VideoEffect> {
        self.video_effects.get(&position).copied()
    }

    /// Set brightness/contrast for the video source at `position`.
    ///
    /// Zero/zero removes the entry. `position` is not checked against the current video sources;
    /// entries without a matching source are skipped on serialization and reported by
    /// [`crate::Scene::validate`].
    pub fn set_video_effects(&mut self, position: usize, brightness: f64, contrast: f64) {
        let effect = VideoEffect {
            brightness,
            contrast,
        };
        if effect.is_noop() {
            self.video_effects.remove(&position);
        } else {
            self.video_effects.insert(position, effect);
        }
    }

    /// Current background.
    pub fn background(&self) -> Option<&Background> {
        self.background.as_ref()
    }

    /// Use a catalog image as background.
    pub fn set_background_image(
        &mut self,
        asset_id: impl Into<AssetId>,
        asset_name: impl Into<String>,
    ) {
        self.set_background(Background::Image {
            image: BackgroundImage {
                id: asset_id.into(),
                name: asset_name.into(),
            },
        });
    }

    /// Use a solid color as background.
    pub fn set_background_color(&mut self, color: impl Into<serde_json::Value>) {
        self.set_background(Background::Color {
            color: color.into(),
        });
    }

    /// Replace the background.
    pub fn set_background(&mut self, background: Background) {
        self.background = Some(background);
    }

    /// Remove the background.
    pub fn clear_background(&mut self) {
        self.background = None;
    }

    /// Serialize to the shot wire fragment.
    ///
    /// The wire fragment holds only strings, bools, numbers and tagged enums, so the `Err` arm
    /// is never produced in practice.
    pub fn to_json(&self) -> AvStudioResult<serde_json::Value> {
        serde_json::to_value(self.to_def())
            .map_err(|e| AvStudioError::serde(format!("serialize shot: {e}")))
    }

    /// Load a shot fragment with default [`LoadOptions`].
    pub fn from_json(value: &serde_json::Value) -> AvStudioResult<Self> {
        Self::from_json_with(value, LoadOptions::default())
    }

    /// Load a shot fragment.
    pub fn from_json_with(value: &serde_json::Value, opts: LoadOptions) -> AvStudioResult<Self> {
        Self::from_json_at(value, opts, &[])
    }

    pub(crate) fn from_json_at(
        value: &serde_json::Value,
        opts: LoadOptions,
        path: &[SchemaPathElem],
    ) -> AvStudioResult<Self> {
        let def = wire::parse_shot_def(value, path)?;
        Ok(Self::from_def(def, opts))
    }

    pub(crate) fn to_def(&self) -> ShotDef {
        wire::shot_to_def(self)
    }

    fn from_def(def: ShotDef, opts: LoadOptions) -> Self {
        let mut shot = Self::new(def.time);
        shot.layout = def.layout;
        shot.skipped = def.skip;

        if let Some(audio) = def.sources.audio {
            shot.audio_sources = audio.into_iter().map(|src| src.id).collect();
        }
        if let Some(video) = def.sources.video {
            let mut ids = Vec::with_capacity(video.len());
            for (i, src) in video.into_iter().enumerate() {
                if opts.effects == EffectsOnLoad::Restore {
                    if let Some(fx) = src.effects {
                        shot.set_video_effects(i, fx.brightness, fx.contrast);
                    }
                }
                ids.push(src.id);
            }
            shot.video_sources = ids;
        }

        shot.background = def.sources.background.or(def.legacy_background);
        shot
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/shot.rs"]
mod tests;

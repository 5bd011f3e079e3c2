//! Wire model for scene API version `2t`.
//!
//! These structs mirror the service JSON one-to-one (PascalCase keys). The public [`Scene`] and
//! [`Shot`] types convert to and from them; nothing else in the crate touches raw JSON keys.

use crate::foundation::core::{AspectRatio, SourceKind, TimeRange};
use crate::foundation::error::AvStudioResult;
use crate::scene::composition::Scene;
use crate::scene::shot::{Background, Shot, VideoEffect};
use crate::schema::validate::{SchemaPathElem, schema_error_at};
use crate::schema::version::{self, SCENE_API_VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SourceEntryDef {
    #[serde(rename = "ID")]
    pub(crate) id: String,
    #[serde(rename = "Effects", default, skip_serializing_if = "Option::is_none")]
    pub(crate) effects: Option<VideoEffect>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ShotSourcesDef {
    #[serde(rename = "Audio", default)]
    pub(crate) audio: Option<Vec<SourceEntryDef>>,
    #[serde(rename = "Video", default)]
    pub(crate) video: Option<Vec<SourceEntryDef>>,
    #[serde(rename = "Background", default, skip_serializing_if = "Option::is_none")]
    pub(crate) background: Option<Background>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct ShotDef {
    #[serde(rename = "Sources")]
    pub(crate) sources: ShotSourcesDef,
    #[serde(rename = "Layout")]
    pub(crate) layout: String,
    #[serde(rename = "Skip")]
    pub(crate) skip: bool,
    // Required key, but `null` is accepted for shots that were never placed.
    #[serde(rename = "Time", deserialize_with = "Option::deserialize")]
    pub(crate) time: Option<f64>,
    // Older payloads put the background next to `Sources` instead of inside it.
    #[serde(rename = "Background", default, skip_serializing)]
    pub(crate) legacy_background: Option<Background>,
}

/// One entry of the derived scene source list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    /// Catalog id of the source.
    #[serde(rename = "SourceID")]
    pub source_id: String,
    /// Always `0`; the service computes real offsets.
    #[serde(rename = "TimeOffset")]
    pub time_offset: i64,
    /// Whether the source is used as video or audio.
    #[serde(rename = "SourceType")]
    pub source_type: SourceKind,
    /// Always empty; reserved by the schema.
    #[serde(rename = "Position")]
    pub position: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct RollDef {
    #[serde(rename = "ID", deserialize_with = "Option::deserialize")]
    pub(crate) id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AspectRatioDef {
    pub(crate) w: serde_json::Value,
    pub(crate) h: serde_json::Value,
}

/// Scene document. `S` is [`ShotDef`] when writing and raw JSON when reading, so each shot can
/// be parsed with its own path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct SceneDef<S> {
    #[serde(rename = "SceneApiVersion")]
    pub(crate) version: String,
    #[serde(rename = "SceneID", deserialize_with = "Option::deserialize")]
    pub(crate) scene_id: Option<String>,
    #[serde(rename = "Name")]
    pub(crate) name: String,
    #[serde(rename = "Preroll", default)]
    pub(crate) preroll: Option<RollDef>,
    #[serde(rename = "Postroll", default)]
    pub(crate) postroll: Option<RollDef>,
    #[serde(rename = "Sources", default, skip_deserializing)]
    pub(crate) sources: Vec<SourceRef>,
    #[serde(rename = "ViewRange")]
    pub(crate) view_range: TimeRange,
    #[serde(rename = "SceneRange")]
    pub(crate) scene_range: TimeRange,
    #[serde(rename = "Shots", default)]
    pub(crate) shots: Vec<S>,
    #[serde(rename = "AspectRatio", default)]
    pub(crate) aspect_ratio: Option<AspectRatioDef>,
}

pub(crate) fn shot_to_def(shot: &Shot) -> ShotDef {
    let n = shot.video_sources().len();
    for &pos in shot.video_effects().keys().filter(|&&pos| pos >= n) {
        tracing::warn!(
            position = pos,
            video_sources = n,
            "video effect has no matching video source; not serialized"
        );
    }

    let video = shot
        .video_sources()
        .iter()
        .enumerate()
        .map(|(i, id)| SourceEntryDef {
            id: id.clone(),
            effects: shot.video_effect(i),
        })
        .collect();
    let audio = shot
        .audio_sources()
        .iter()
        .map(|id| SourceEntryDef {
            id: id.clone(),
            effects: None,
        })
        .collect();

    ShotDef {
        sources: ShotSourcesDef {
            audio: Some(audio),
            video: Some(video),
            background: shot.background().cloned(),
        },
        layout: shot.layout().to_owned(),
        skip: shot.skipped(),
        time: shot.timestamp(),
        legacy_background: None,
    }
}

pub(crate) fn parse_shot_def(
    value: &serde_json::Value,
    path: &[SchemaPathElem],
) -> AvStudioResult<ShotDef> {
    if !value.is_object() {
        return Err(schema_error_at(path, "shot JSON must be an object"));
    }
    ShotDef::deserialize(value).map_err(|e| schema_error_at(path, e))
}

/// De-duplicated sources referenced by `shots`: video ids, then audio ids, each ascending.
pub(crate) fn collect_sources<'a>(shots: impl IntoIterator<Item = &'a Shot>) -> Vec<SourceRef> {
    let mut video = BTreeSet::<&str>::new();
    let mut audio = BTreeSet::<&str>::new();
    for shot in shots {
        video.extend(shot.video_sources().iter().map(String::as_str));
        audio.extend(shot.audio_sources().iter().map(String::as_str));
    }

    let tagged = video
        .into_iter()
        .map(|id| (id, SourceKind::Video))
        .chain(audio.into_iter().map(|id| (id, SourceKind::Audio)));
    tagged
        .map(|(id, kind)| SourceRef {
            source_id: id.to_owned(),
            time_offset: 0,
            source_type: kind,
            position: String::new(),
        })
        .collect()
}

pub(crate) fn scene_to_def(scene: &Scene) -> SceneDef<ShotDef> {
    let ar = scene.aspect_ratio();
    SceneDef {
        version: SCENE_API_VERSION.to_owned(),
        scene_id: scene.id().map(str::to_owned),
        name: scene.name().to_owned(),
        preroll: Some(RollDef {
            id: Some(scene.preroll().unwrap_or_default().to_owned()),
        }),
        postroll: Some(RollDef {
            id: Some(scene.postroll().unwrap_or_default().to_owned()),
        }),
        sources: collect_sources(scene.shots()),
        view_range: scene.view_range(),
        scene_range: scene.scene_range(),
        shots: scene.shots().iter().map(Shot::to_def).collect(),
        aspect_ratio: Some(AspectRatioDef {
            w: ar.w.into(),
            h: ar.h.into(),
        }),
    }
}

/// Parse and gate a scene document. Nothing is built unless the whole document is valid.
pub(crate) fn parse_scene_def(
    value: &serde_json::Value,
) -> AvStudioResult<SceneDef<serde_json::Value>> {
    let Some(obj) = value.as_object() else {
        return Err(schema_error_at(&[], "scene JSON must be an object"));
    };

    let version_path = [SchemaPathElem::Field("SceneApiVersion")];
    match obj.get("SceneApiVersion") {
        None => return Err(schema_error_at(&version_path, "missing field")),
        Some(serde_json::Value::String(v)) if version::is_supported(v) => {}
        Some(other) => {
            return Err(schema_error_at(
                &version_path,
                format!("unsupported version {other}, only \"{SCENE_API_VERSION}\" is supported"),
            ));
        }
    }

    SceneDef::<serde_json::Value>::deserialize(value).map_err(|e| schema_error_at(&[], e))
}

pub(crate) fn parse_aspect_ratio(def: &AspectRatioDef) -> AvStudioResult<AspectRatio> {
    AspectRatio::from_json_components(&def.w, &def.h)
}

/// Map the wire roll id to the model: empty or `null` means "no roll".
pub(crate) fn roll_id(def: Option<RollDef>) -> Option<String> {
    def.and_then(|r| r.id).filter(|id| !id.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/scene/wire.rs"]
mod tests;

use crate::foundation::core::{AspectRatio, AssetId, SceneId, SourceId, TimeRange};
use crate::foundation::error::{AvStudioError, AvStudioResult};
use crate::scene::load::LoadOptions;
use crate::scene::shot::Shot;
use crate::scene::wire::{self, SourceRef};
use crate::schema::validate::{SchemaIssue, SchemaPathElem, validate_scene};
use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write as _};
use std::path::Path;

/// Placeholder range of a freshly constructed scene (2017-02-08T16:30:00Z + 10s).
pub const DEFAULT_SCENE_RANGE: TimeRange = TimeRange::new(1_486_571_400.0, 1_486_571_410.0);

/// Padding added on both sides of the scene range to derive the view range.
pub const VIEW_RANGE_MARGIN: f64 = 10.0;

/// View range shown around `scene_range`: the scene range padded by [`VIEW_RANGE_MARGIN`].
pub fn derive_view_range(scene_range: TimeRange) -> TimeRange {
    scene_range.pad(VIEW_RANGE_MARGIN)
}

fn default_name() -> String {
    chrono::Local::now().format("AUTO %H_%M_%S").to_string()
}

/// Total order on optional timestamps: unset first, then ascending (`total_cmp`).
fn cmp_timestamp(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

/// A scene: global timeline parameters plus the shots composed on it.
///
/// Built client-side with [`Scene::new`] and [`Scene::add_shot`], or loaded from the service
/// with [`Scene::from_json`]. Serialized with [`Scene::to_json`].
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    id: Option<SceneId>,
    name: String,
    preroll: Option<AssetId>,
    postroll: Option<AssetId>,
    scene_range: TimeRange,
    view_range: TimeRange,
    aspect_ratio: AspectRatio,
    shots: Vec<Shot>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an unsaved, empty scene named after the current local time.
    pub fn new() -> Self {
        Self {
            id: None,
            name: default_name(),
            preroll: None,
            postroll: None,
            scene_range: DEFAULT_SCENE_RANGE,
            view_range: DEFAULT_SCENE_RANGE,
            aspect_ratio: AspectRatio::default(),
            shots: Vec::new(),
        }
    }

    /// Service-assigned id; `None` until the scene is saved.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Set or clear the id.
    pub fn set_id(&mut self, id: Option<SceneId>) {
        self.id = id;
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the scene.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Asset prepended to the rendered output.
    pub fn preroll(&self) -> Option<&str> {
        self.preroll.as_deref()
    }

    /// Set or clear the preroll asset. An empty id clears it, as it does on the wire.
    pub fn set_preroll(&mut self, asset: Option<AssetId>) {
        self.preroll = asset.filter(|id| !id.is_empty());
    }

    /// Asset appended to the rendered output.
    pub fn postroll(&self) -> Option<&str> {
        self.postroll.as_deref()
    }

    /// Set or clear the postroll asset. An empty id clears it, as it does on the wire.
    pub fn set_postroll(&mut self, asset: Option<AssetId>) {
        self.postroll = asset.filter(|id| !id.is_empty());
    }

    /// Authored time bounds.
    pub fn scene_range(&self) -> TimeRange {
        self.scene_range
    }

    /// Set the authored time bounds and re-derive the view range from them.
    ///
    /// Any view range set earlier with [`Scene::set_view_range`] is replaced.
    pub fn set_scene_range(&mut self, range: impl Into<TimeRange>) {
        let range = range.into();
        self.scene_range = range;
        self.view_range = derive_view_range(range);
    }

    /// Visible time window.
    pub fn view_range(&self) -> TimeRange {
        self.view_range
    }

    /// Set the visible window directly. The scene range is not touched.
    pub fn set_view_range(&mut self, range: impl Into<TimeRange>) {
        self.view_range = range.into();
    }

    /// Output aspect ratio.
    pub fn aspect_ratio(&self) -> AspectRatio {
        self.aspect_ratio
    }

    /// Set the output aspect ratio. Use [`AspectRatio::parse`] for untyped input.
    pub fn set_aspect_ratio(&mut self, ar: AspectRatio) {
        self.aspect_ratio = ar;
    }

    /// Shots in timeline order.
    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    /// Number of shots.
    pub fn shot_count(&self) -> usize {
        self.shots.len()
    }

    /// Shot at `index` in the current order.
    pub fn shot(&self, index: usize) -> AvStudioResult<&Shot> {
        let len = self.shots.len();
        self.shots
            .get(index)
            .ok_or_else(|| AvStudioError::index(index, len))
    }

    /// Mutable shot at `index`. Changing its timestamp does not re-sort; see [`Scene::resort`].
    pub fn shot_mut(&mut self, index: usize) -> AvStudioResult<&mut Shot> {
        let len = self.shots.len();
        self.shots
            .get_mut(index)
            .ok_or_else(|| AvStudioError::index(index, len))
    }

    /// Add a shot and keep the shot list sorted by timestamp.
    ///
    /// A `None` timestamp places the shot at the start of the scene range. Shots with equal
    /// timestamps keep insertion order. The returned borrow points at the new shot so effects,
    /// background or layout can be set on it directly.
    pub fn add_shot(
        &mut self,
        timestamp: Option<f64>,
        video_sources: Vec<SourceId>,
        audio_sources: Vec<SourceId>,
    ) -> &mut Shot {
        let timestamp = timestamp.unwrap_or(self.scene_range.begin);
        self.shots.push(Shot::with_sources(
            Some(timestamp),
            video_sources,
            audio_sources,
        ));
        self.resort();

        // Stable sort keeps the new shot last among its equals.
        let idx = self
            .shots
            .partition_point(|s| cmp_timestamp(s.timestamp(), Some(timestamp)) != Ordering::Greater)
            - 1;
        &mut self.shots[idx]
    }

    /// Remove and return the shot at `index`.
    pub fn remove_shot(&mut self, index: usize) -> AvStudioResult<Shot> {
        if index >= self.shots.len() {
            return Err(AvStudioError::index(index, self.shots.len()));
        }
        Ok(self.shots.remove(index))
    }

    /// Stable re-sort of the shots by timestamp.
    ///
    /// Loading does not sort (payload order is kept); call this when the ordering invariant is
    /// needed for a loaded scene or after moving shots with [`Shot::set_timestamp`].
    pub fn resort(&mut self) {
        self.shots
            .sort_by(|a, b| cmp_timestamp(a.timestamp(), b.timestamp()));
    }

    /// Every source referenced by any shot, once per (id, kind).
    pub fn sources(&self) -> Vec<SourceRef> {
        wire::collect_sources(&self.shots)
    }

    /// Check model consistency (ranges, aspect ratio, layouts, effect positions).
    ///
    /// Serialization does not require a valid scene; this is for callers that want to catch
    /// mistakes before talking to the service.
    pub fn validate(&self) -> AvStudioResult<()> {
        let issues = self.issues();
        if issues.is_empty() {
            return Ok(());
        }
        let msg = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(AvStudioError::validation(msg))
    }

    /// All consistency issues, in document order.
    pub fn issues(&self) -> Vec<SchemaIssue> {
        validate_scene(self)
    }

    /// Serialize to the scene wire document.
    ///
    /// Every wire type maps to JSON without fallible conversions (non-finite floats become
    /// `null`), so the `Err` arm is never produced for a scene built through this API.
    pub fn to_json(&self) -> AvStudioResult<serde_json::Value> {
        serde_json::to_value(wire::scene_to_def(self))
            .map_err(|e| AvStudioError::serde(format!("serialize scene: {e}")))
    }

    /// Load a scene document with default [`LoadOptions`].
    pub fn from_json(value: &serde_json::Value) -> AvStudioResult<Self> {
        Self::from_json_with(value, LoadOptions::default())
    }

    /// Load a scene document.
    ///
    /// Fails with [`AvStudioError::Schema`] on any shape mismatch or unsupported
    /// `SceneApiVersion`, and with [`AvStudioError::TypeConversion`] when the aspect ratio is not
    /// integral. The payload's `ViewRange` is kept as-is.
    pub fn from_json_with(value: &serde_json::Value, opts: LoadOptions) -> AvStudioResult<Self> {
        let def = wire::parse_scene_def(value)?;

        let aspect_ratio = match &def.aspect_ratio {
            Some(ar) => wire::parse_aspect_ratio(ar)?,
            None => AspectRatio::default(),
        };

        let shots = def
            .shots
            .iter()
            .enumerate()
            .map(|(i, v)| {
                Shot::from_json_at(
                    v,
                    opts,
                    &[SchemaPathElem::Field("Shots"), SchemaPathElem::Index(i)],
                )
            })
            .collect::<AvStudioResult<Vec<_>>>()?;

        let mut scene = Self {
            id: def.scene_id,
            name: def.name,
            preroll: wire::roll_id(def.preroll),
            postroll: wire::roll_id(def.postroll),
            scene_range: def.scene_range,
            view_range: def.view_range,
            aspect_ratio,
            shots,
        };
        if opts.resort_shots {
            scene.resort();
        }
        Ok(scene)
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(s: &str) -> AvStudioResult<Self> {
        let value: serde_json::Value = serde_json::from_str(s)
            .map_err(|e| AvStudioError::schema(format!("parse scene JSON: {e}")))?;
        Self::from_json(&value)
    }

    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R, opts: LoadOptions) -> AvStudioResult<Self> {
        let value: serde_json::Value = serde_json::from_reader(r)
            .map_err(|e| AvStudioError::schema(format!("parse scene JSON: {e}")))?;
        Self::from_json_with(&value, opts)
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>, opts: LoadOptions) -> AvStudioResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            AvStudioError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f), opts)
    }

    /// Write the scene document as pretty-printed JSON.
    pub fn to_writer_pretty<W: std::io::Write>(&self, w: W) -> AvStudioResult<()> {
        serde_json::to_writer_pretty(w, &wire::scene_to_def(self))
            .map_err(|e| AvStudioError::serde(format!("write scene JSON: {e}")))
    }

    /// Write the scene document to a file, replacing it.
    pub fn to_path(&self, path: impl AsRef<Path>) -> AvStudioResult<()> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|e| {
            AvStudioError::validation(format!("create scene JSON '{}': {e}", path.display()))
        })?;
        let mut w = BufWriter::new(f);
        self.to_writer_pretty(&mut w)?;
        w.flush().map_err(|e| {
            AvStudioError::validation(format!("write scene JSON '{}': {e}", path.display()))
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/composition.rs"]
mod tests;

use crate::client::transport::Transport;
use crate::client::{expect_array, expect_str, saved_id};
use crate::foundation::core::{AssetId, SceneId};
use crate::foundation::error::AvStudioResult;
use crate::scene::composition::Scene;
use crate::scene::load::LoadOptions;
use serde_json::{Map, Value};

/// Scene persistence (`scenes/...` routes).
pub struct Scenes<'a, T: Transport + ?Sized> {
    transport: &'a T,
    load: LoadOptions,
}

impl<'a, T: Transport + ?Sized> Scenes<'a, T> {
    /// Client over `transport`, loading scenes with default [`LoadOptions`].
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            load: LoadOptions::default(),
        }
    }

    /// Use `load` whenever a scene document is read back from the service.
    pub fn with_load_options(mut self, load: LoadOptions) -> Self {
        self.load = load;
        self
    }

    /// Create `scene` as a new scene (its id is ignored) and return the stored copy.
    #[tracing::instrument(level = "debug", skip_all, fields(name = scene.name()))]
    pub fn add(&self, scene: &Scene) -> AvStudioResult<Scene> {
        let mut doc = scene.to_json()?;
        doc["SceneID"] = Value::Null;
        let created = self.transport.post("scenes", &doc)?;
        let id = expect_str(&created, "ID", "POST scenes")?;
        tracing::info!(id, "scene created");
        self.get(id)
    }

    /// Replace the stored scene with `scene` (`PUT scenes/{id}`).
    #[tracing::instrument(level = "debug", skip_all, fields(id = scene.id()))]
    pub fn update(&self, scene: &Scene) -> AvStudioResult<Value> {
        let id = saved_id(scene)?;
        self.transport.put(&format!("scenes/{id}"), &scene.to_json()?)
    }

    /// Post `scene` as-is, id included (`POST scenes`).
    #[tracing::instrument(level = "debug", skip_all, fields(id = scene.id()))]
    pub fn save(&self, scene: &Scene) -> AvStudioResult<Value> {
        self.transport.post("scenes", &scene.to_json()?)
    }

    /// Fetch and load one scene.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get(&self, scene_id: &str) -> AvStudioResult<Scene> {
        let doc = self.transport.get(&format!("scenes/{scene_id}"))?;
        Scene::from_json_with(&doc, self.load)
    }

    /// Fetch every scene (one request per scene after the listing).
    pub fn get_all(&self) -> AvStudioResult<Vec<Scene>> {
        self.get_all_ids()?.iter().map(|id| self.get(id)).collect()
    }

    /// Ids of every scene of the team.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_all_ids(&self) -> AvStudioResult<Vec<SceneId>> {
        let listing = expect_array(self.transport.get("scenes")?, "GET scenes")?;
        listing
            .iter()
            .map(|entry| expect_str(entry, "SceneID", "GET scenes").map(str::to_owned))
            .collect()
    }

    /// Delete a scene by id.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_by_id(&self, scene_id: &str) -> AvStudioResult<Value> {
        self.transport.delete(&format!("scenes/{scene_id}"))
    }

    /// Delete a saved scene.
    pub fn delete(&self, scene: &Scene) -> AvStudioResult<Value> {
        self.delete_by_id(saved_id(scene)?)
    }

    /// Delete every scene of the team. Returns how many were deleted.
    pub fn delete_all(&self) -> AvStudioResult<usize> {
        let ids = self.get_all_ids()?;
        for id in &ids {
            self.delete_by_id(id)?;
        }
        tracing::info!(count = ids.len(), "deleted all scenes");
        Ok(ids.len())
    }

    /// Set pre/post-roll on several scenes at once (`POST scenes/rolls`).
    ///
    /// Rolls passed as `None` are left unchanged on the service.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn batch_set(
        &self,
        scene_ids: &[SceneId],
        preroll: Option<&AssetId>,
        postroll: Option<&AssetId>,
    ) -> AvStudioResult<Value> {
        self.transport.post("scenes/rolls", &rolls_body(scene_ids, preroll, postroll))
    }
}

fn rolls_body(
    scene_ids: &[SceneId],
    preroll: Option<&AssetId>,
    postroll: Option<&AssetId>,
) -> Value {
    let mut body = Map::new();
    body.insert(
        "Scenes".to_owned(),
        Value::Array(scene_ids.iter().cloned().map(Value::String).collect()),
    );
    for (key, roll) in [("Preroll", preroll), ("Postroll", postroll)] {
        if let Some(id) = roll {
            let mut r = Map::new();
            r.insert("ID".to_owned(), Value::String(id.clone()));
            body.insert(key.to_owned(), Value::Object(r));
        }
    }
    Value::Object(body)
}

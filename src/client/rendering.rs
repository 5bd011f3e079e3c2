use crate::client::transport::Transport;
use crate::client::{decode, expect_array, saved_id};
use crate::foundation::error::{AvStudioError, AvStudioResult};
use crate::scene::composition::Scene;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;
use std::time::{Duration, Instant};

/// Bitrate requested when none is given.
pub const DEFAULT_BITRATE: u64 = 800_000;

/// Output frame size of a render.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FrameSize {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Default for FrameSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 360,
        }
    }
}

/// Parameters of `start_rendering`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderOptions {
    /// Upload targets; the service keeps results itself when empty.
    pub locations: Vec<Value>,
    /// Target bitrate in bits per second.
    pub bitrate: u64,
    /// Output frame size.
    pub frame_size: FrameSize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            locations: Vec::new(),
            bitrate: DEFAULT_BITRATE,
            frame_size: FrameSize::default(),
        }
    }
}

/// A snapshot request for `get_scene_thumbnail`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThumbnailRequest {
    /// Timestamp in seconds; absolute unless `relative`.
    pub timestamp: f64,
    /// Interpret `timestamp` as an offset from the scene range start.
    pub relative: bool,
    /// Allow snapshots outside the scene range.
    pub out_of_scene: bool,
    /// Size hint passed through to the service (e.g. `"320x180"`).
    pub size: Option<String>,
}

impl ThumbnailRequest {
    /// Absolute-timestamp snapshot.
    pub fn at(timestamp: f64) -> Self {
        Self {
            timestamp,
            ..Self::default()
        }
    }

    fn path_for(&self, scene: &Scene, scene_id: &str) -> String {
        let from = if self.relative {
            scene.scene_range().begin + self.timestamp
        } else {
            self.timestamp
        };
        let oos = if self.out_of_scene { "yes" } else { "" };
        let mut path =
            format!("media/scenes/{scene_id}/snapshot?from={from:.6}&out-of-scene={oos}");
        if let Some(size) = &self.size {
            path.push_str("&size=");
            path.push_str(size);
        }
        path
    }
}

/// Polling cadence of `wait_for_task`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between polls.
    pub interval: Duration,
    /// Give up after this long.
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            timeout: Duration::from_secs(600),
        }
    }
}

/// A render task as listed by the service.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RenderTask {
    /// Task id.
    #[serde(rename = "ID")]
    pub id: String,
    /// Scene the task renders, when reported.
    #[serde(rename = "Scene", default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Result location below `media/`, once the output exists.
    #[serde(rename = "Url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Every other field the service reports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RenderTask {
    /// Whether the task reports a downloadable result.
    pub fn has_result(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// A rendered output file.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct RenderedFile {
    /// Id of the render task that produced the file.
    #[serde(rename = "ID")]
    pub id: String,
    /// Scene the file was rendered from.
    #[serde(rename = "Scene", default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,
    /// Location below `media/`.
    #[serde(rename = "Url", default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Every other field the service reports.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn result_path(id: &str, url: Option<&str>) -> AvStudioResult<String> {
    match url {
        Some(u) if !u.is_empty() => Ok(format!("media/{u}")),
        _ => Err(AvStudioError::not_found(format!("rendered file {id} has no download url"))),
    }
}

/// Render control and rendered media (`media/...`, `shares...` routes).
pub struct Rendering<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> Rendering<'a, T> {
    /// Client over `transport`.
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Every render task of the team.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_all(&self) -> AvStudioResult<Vec<RenderTask>> {
        expect_array(self.transport.get("media/renders")?, "GET media/renders")?
            .into_iter()
            .map(|t| decode(t, "render task"))
            .collect()
    }

    /// Same as [`Rendering::get_all`].
    pub fn get_tasks(&self) -> AvStudioResult<Vec<RenderTask>> {
        self.get_all()
    }

    /// Render profiles offered by the service, as returned.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_render_profiles(&self) -> AvStudioResult<Value> {
        self.transport.get("media/profiles")
    }

    /// Look a task up in the team-wide listing.
    pub fn get_task_by_id(&self, task_id: &str) -> AvStudioResult<Option<RenderTask>> {
        Ok(self.get_all()?.into_iter().find(|t| t.id == task_id))
    }

    /// Queue a render of a saved scene.
    #[tracing::instrument(level = "debug", skip(self, scene, opts), fields(id = scene.id()))]
    pub fn start_rendering(&self, scene: &Scene, opts: &RenderOptions) -> AvStudioResult<Value> {
        let id = saved_id(scene)?;
        let body = serde_json::to_value(opts).map_err(|e| AvStudioError::serde(e.to_string()))?;
        let resp = self.transport.post(&format!("media/scenes/{id}/render"), &body)?;
        tracing::info!(
            scene = id,
            bitrate = opts.bitrate,
            width = opts.frame_size.width,
            height = opts.frame_size.height,
            "render started"
        );
        Ok(resp)
    }

    /// Stop a running task of a saved scene.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn stop_rendering(&self, scene: &Scene, task_id: &str) -> AvStudioResult<Value> {
        let id = saved_id(scene)?;
        self.transport.post(&format!("media/scenes/{id}/tasks/{task_id}/stop"), &Value::Null)
    }

    /// Tasks of one scene.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn get_tasks_for_scene(&self, scene: &Scene) -> AvStudioResult<Vec<RenderTask>> {
        let id = saved_id(scene)?;
        let what = format!("GET media/scenes/{id}/tasks");
        expect_array(self.transport.get(&format!("media/scenes/{id}/tasks"))?, &what)?
            .into_iter()
            .map(|t| decode(t, "render task"))
            .collect()
    }

    /// One task of a scene.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn get_task_for_scene_by_id(
        &self,
        scene: &Scene,
        task_id: &str,
    ) -> AvStudioResult<RenderTask> {
        let id = saved_id(scene)?;
        let task = self.transport.get(&format!("media/scenes/{id}/tasks/{task_id}"))?;
        decode(task, "render task")
    }

    /// Poll a task until `is_done` accepts it.
    ///
    /// Fails with a transport error once `poll.timeout` has elapsed.
    pub fn wait_for_task(
        &self,
        scene: &Scene,
        task_id: &str,
        poll: PollOptions,
        mut is_done: impl FnMut(&RenderTask) -> bool,
    ) -> AvStudioResult<RenderTask> {
        let started = Instant::now();
        loop {
            let task = self.get_task_for_scene_by_id(scene, task_id)?;
            if is_done(&task) {
                tracing::info!(task = task_id, elapsed = ?started.elapsed(), "task done");
                return Ok(task);
            }
            if started.elapsed() + poll.interval > poll.timeout {
                return Err(AvStudioError::transport(format!(
                    "task {task_id} not done after {:?}",
                    poll.timeout
                )));
            }
            tracing::debug!(task = task_id, "task pending");
            std::thread::sleep(poll.interval);
        }
    }

    /// Download a snapshot of a saved scene to `local_path`.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn get_scene_thumbnail(
        &self,
        scene: &Scene,
        req: &ThumbnailRequest,
        local_path: &Path,
    ) -> AvStudioResult<()> {
        let id = saved_id(scene)?;
        self.transport.download_to_file(&req.path_for(scene, id), local_path)
    }

    /// Every rendered file of the team.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn get_rendered_files(&self) -> AvStudioResult<Vec<RenderedFile>> {
        expect_array(self.transport.get("media/results")?, "GET media/results")?
            .into_iter()
            .map(|f| decode(f, "rendered file"))
            .collect()
    }

    /// Look a rendered file up by task id.
    pub fn get_rendered_file_by_id(&self, render_id: &str) -> AvStudioResult<Option<RenderedFile>> {
        Ok(self.get_rendered_files()?.into_iter().find(|f| f.id == render_id))
    }

    fn require_rendered_file(&self, render_id: &str) -> AvStudioResult<RenderedFile> {
        self.get_rendered_file_by_id(render_id)?
            .ok_or_else(|| AvStudioError::not_found(format!("rendered file {render_id}")))
    }

    /// Download the rendered file of a task id.
    pub fn download_rendered_file_for_task_id(
        &self,
        render_id: &str,
        local_path: &Path,
    ) -> AvStudioResult<()> {
        let file = self.require_rendered_file(render_id)?;
        self.download_rendered_file_for_task(&file, local_path)
    }

    /// Download an already listed rendered file.
    #[tracing::instrument(level = "debug", skip(self, file), fields(id = %file.id))]
    pub fn download_rendered_file_for_task(
        &self,
        file: &RenderedFile,
        local_path: &Path,
    ) -> AvStudioResult<()> {
        let path = result_path(&file.id, file.url.as_deref())?;
        self.transport.download_to_file(&path, local_path)
    }

    /// Delete a rendered file, looking its scene up first.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_rendered_file(&self, render_id: &str) -> AvStudioResult<Value> {
        let file = self.require_rendered_file(render_id)?;
        let scene = file.scene.as_deref().ok_or_else(|| {
            AvStudioError::schema(format!("rendered file {render_id}: missing field \"Scene\""))
        })?;
        self.remove(scene, render_id)
    }

    /// Delete the rendered file of a task of a saved scene.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn delete_rendered_file_for_scene(
        &self,
        scene: &Scene,
        render_id: &str,
    ) -> AvStudioResult<Value> {
        self.remove(saved_id(scene)?, render_id)
    }

    fn remove(&self, scene_id: &str, render_id: &str) -> AvStudioResult<Value> {
        self.transport.post(
            &format!("media/scenes/{scene_id}/tasks/{render_id}/remove"),
            &Value::Null,
        )
    }

    /// Publish a rendered file; the response carries the share link.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn share_rendered_file(&self, scene: &Scene, render_id: &str) -> AvStudioResult<Value> {
        let id = saved_id(scene)?;
        self.transport.get(&format!("media/scenes/{id}/results/{render_id}/share"))
    }

    /// Withdraw a published rendered file.
    #[tracing::instrument(level = "debug", skip(self, scene), fields(id = scene.id()))]
    pub fn unshare_rendered_file(&self, scene: &Scene, render_id: &str) -> AvStudioResult<Value> {
        let id = saved_id(scene)?;
        self.transport.get(&format!("media/scenes/{id}/results/{render_id}/unshare"))
    }

    /// Delete a share by its link (as returned by the service, starting with `/`).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn delete_share_by_link(&self, link: &str) -> AvStudioResult<Value> {
        self.transport.delete(&format!("shares{link}"))
    }

    /// Fetch the first bytes of a public share without team credentials.
    ///
    /// Returns the HTTP status (200 or 206).
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn check_public_share(&self, link: &str) -> AvStudioResult<u16> {
        self.transport.probe_public(&format!("public/shares{link}"), Some((0, 100)))
    }

    /// Public metadata of a share.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn check_public_share_details(&self, link: &str) -> AvStudioResult<Value> {
        self.transport.get_public(&format!("public/shares{link}/details"))
    }
}

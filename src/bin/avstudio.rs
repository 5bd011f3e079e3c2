use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use avstudio::{
    ApiConfig, FrameSize, HttpTransport, LoadOptions, PollOptions, RenderOptions, Rendering, Scene,
    Scenes, ThumbnailRequest,
};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "avstudio", version)]
struct Cli {
    #[command(flatten)]
    conn: ConnArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct ConnArgs {
    /// JSON config file (`base_url`, `api_prefix`, `token`, `team`, `timeout_secs`).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Service origin; overrides the config file and `AVSTUDIO_BASE_URL`.
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API token; overrides the config file and `AVSTUDIO_TOKEN`.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Team id; overrides the config file and `AVSTUDIO_TEAM`.
    #[arg(long, global = true)]
    team: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a scene file and list every problem found.
    Validate(SceneFileArgs),
    /// Print a summary of a scene file.
    Inspect(SceneFileArgs),
    /// Upload a scene file: update when it has an id, create otherwise.
    Push(PushArgs),
    /// Download a scene to a file.
    Pull(PullArgs),
    /// Start rendering a saved scene.
    Render(RenderArgs),
    /// Download the rendered file of a task.
    Download(DownloadArgs),
    /// Delete a scene from the service.
    Delete(SceneIdArgs),
    /// Save a snapshot of a scene at a timestamp.
    Thumbnail(ThumbnailArgs),
}

#[derive(Args, Debug)]
struct SceneFileArgs {
    /// Scene JSON file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Restore video effects and re-sort shots while loading.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

impl SceneFileArgs {
    fn load(&self) -> anyhow::Result<Scene> {
        let opts = if self.strict {
            LoadOptions::strict()
        } else {
            LoadOptions::default()
        };
        Scene::from_path(&self.in_path, opts)
            .with_context(|| format!("load scene '{}'", self.in_path.display()))
    }
}

#[derive(Args, Debug)]
struct PushArgs {
    #[command(flatten)]
    scene: SceneFileArgs,

    /// Write the stored scene back to this file after a create.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PullArgs {
    /// Scene id.
    #[arg(long)]
    id: String,

    /// Output scene JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SceneIdArgs {
    /// Scene id.
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Scene id.
    #[arg(long)]
    id: String,

    /// Target bitrate in bits per second.
    #[arg(long, default_value_t = avstudio::client::rendering::DEFAULT_BITRATE)]
    bitrate: u64,

    /// Output width in pixels.
    #[arg(long, default_value_t = 640)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 360)]
    height: u32,

    /// Wait until the task reports a result.
    #[arg(long, default_value_t = false)]
    wait: bool,

    /// Seconds between polls while waiting.
    #[arg(long, default_value_t = 2)]
    poll_secs: u64,

    /// Give up waiting after this many seconds.
    #[arg(long, default_value_t = 600)]
    wait_timeout_secs: u64,

    /// Download the result here once done (implies `--wait`).
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct DownloadArgs {
    /// Render task id.
    #[arg(long)]
    task: String,

    /// Output media path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ThumbnailArgs {
    /// Scene id.
    #[arg(long)]
    id: String,

    /// Timestamp in seconds.
    #[arg(long)]
    at: f64,

    /// Treat `--at` as an offset from the scene range start.
    #[arg(long, default_value_t = false)]
    relative: bool,

    /// Allow timestamps outside the scene range.
    #[arg(long, default_value_t = false)]
    out_of_scene: bool,

    /// Size hint passed to the service, e.g. `320x180`.
    #[arg(long)]
    size: Option<String>,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Push(args) => cmd_push(&connect(&cli.conn)?, args),
        Command::Pull(args) => cmd_pull(&connect(&cli.conn)?, args),
        Command::Render(args) => cmd_render(&connect(&cli.conn)?, args),
        Command::Download(args) => cmd_download(&connect(&cli.conn)?, args),
        Command::Delete(args) => cmd_delete(&connect(&cli.conn)?, args),
        Command::Thumbnail(args) => cmd_thumbnail(&connect(&cli.conn)?, args),
    }
}

fn connect(conn: &ConnArgs) -> anyhow::Result<HttpTransport> {
    let mut cfg = match &conn.config {
        Some(path) => ApiConfig::from_path(path)?,
        None => ApiConfig::default(),
    }
    .with_env()?;
    if let Some(url) = &conn.base_url {
        cfg.base_url = url.clone();
    }
    if let Some(token) = &conn.token {
        cfg.token = Some(token.clone());
    }
    if let Some(team) = &conn.team {
        cfg.team = Some(team.clone());
    }
    HttpTransport::new(cfg).context("configure service connection")
}

fn cmd_validate(args: SceneFileArgs) -> anyhow::Result<()> {
    let scene = args.load()?;
    let issues = scene.issues();
    for issue in &issues {
        println!("{issue}");
    }
    if !issues.is_empty() {
        anyhow::bail!("{} problem(s) in '{}'", issues.len(), args.in_path.display());
    }
    println!("ok: {} shot(s)", scene.shot_count());
    Ok(())
}

fn cmd_inspect(args: SceneFileArgs) -> anyhow::Result<()> {
    let scene = args.load()?;
    let range = scene.scene_range();
    let ar = scene.aspect_ratio();
    println!("name:         {}", scene.name());
    println!("id:           {}", scene.id().unwrap_or("-"));
    println!("scene range:  {} .. {} ({}s)", range.begin, range.end, range.duration());
    println!("aspect ratio: {}:{}", ar.w, ar.h);
    println!("shots:        {}", scene.shot_count());
    for (i, shot) in scene.shots().iter().enumerate() {
        let at = shot
            .timestamp()
            .map_or_else(|| "-".to_owned(), |t| t.to_string());
        println!(
            "  [{i}] t={at} layout={} video={:?} audio={:?}{}",
            shot.layout(),
            shot.video_sources(),
            shot.audio_sources(),
            if shot.skipped() { " (skip)" } else { "" }
        );
    }
    println!("sources:      {}", scene.sources().len());
    Ok(())
}

fn cmd_push(transport: &HttpTransport, args: PushArgs) -> anyhow::Result<()> {
    let scene = args.scene.load()?;
    scene.validate().context("refusing to push an invalid scene")?;
    let scenes = Scenes::new(transport);
    match scene.id() {
        Some(id) => {
            scenes.update(&scene).with_context(|| format!("update scene {id}"))?;
            println!("{id}");
        }
        None => {
            let stored = scenes.add(&scene).context("create scene")?;
            if let Some(out) = &args.out {
                stored
                    .to_path(out)
                    .with_context(|| format!("write '{}'", out.display()))?;
            }
            println!("{}", stored.id().unwrap_or_default());
        }
    }
    Ok(())
}

fn cmd_pull(transport: &HttpTransport, args: PullArgs) -> anyhow::Result<()> {
    let scene = Scenes::new(transport)
        .with_load_options(LoadOptions::strict())
        .get(&args.id)
        .with_context(|| format!("fetch scene {}", args.id))?;
    scene
        .to_path(&args.out)
        .with_context(|| format!("write '{}'", args.out.display()))?;
    Ok(())
}

fn cmd_render(transport: &HttpTransport, args: RenderArgs) -> anyhow::Result<()> {
    let scene = Scenes::new(transport)
        .get(&args.id)
        .with_context(|| format!("fetch scene {}", args.id))?;
    let rendering = Rendering::new(transport);
    let opts = RenderOptions {
        bitrate: args.bitrate,
        frame_size: FrameSize {
            width: args.width,
            height: args.height,
        },
        ..RenderOptions::default()
    };
    let started = rendering
        .start_rendering(&scene, &opts)
        .context("start rendering")?;
    let task_id = started
        .get("ID")
        .and_then(serde_json::Value::as_str)
        .context("render response carries no task ID")?
        .to_owned();
    println!("{task_id}");

    if !args.wait && args.out.is_none() {
        return Ok(());
    }
    let poll = PollOptions {
        interval: Duration::from_secs(args.poll_secs),
        timeout: Duration::from_secs(args.wait_timeout_secs),
    };
    let task = rendering
        .wait_for_task(&scene, &task_id, poll, |t| t.has_result())
        .with_context(|| format!("wait for task {task_id}"))?;
    if let Some(out) = &args.out {
        rendering
            .download_rendered_file_for_task_id(&task.id, out)
            .with_context(|| format!("download result of task {task_id}"))?;
    }
    Ok(())
}

fn cmd_download(transport: &HttpTransport, args: DownloadArgs) -> anyhow::Result<()> {
    Rendering::new(transport)
        .download_rendered_file_for_task_id(&args.task, &args.out)
        .with_context(|| format!("download result of task {}", args.task))
}

fn cmd_delete(transport: &HttpTransport, args: SceneIdArgs) -> anyhow::Result<()> {
    Scenes::new(transport)
        .delete_by_id(&args.id)
        .with_context(|| format!("delete scene {}", args.id))?;
    Ok(())
}

fn cmd_thumbnail(transport: &HttpTransport, args: ThumbnailArgs) -> anyhow::Result<()> {
    let scene = Scenes::new(transport)
        .get(&args.id)
        .with_context(|| format!("fetch scene {}", args.id))?;
    let req = ThumbnailRequest {
        timestamp: args.at,
        relative: args.relative,
        out_of_scene: args.out_of_scene,
        size: args.size,
    };
    Rendering::new(transport)
        .get_scene_thumbnail(&scene, &req, &args.out)
        .with_context(|| format!("snapshot scene {} at {}", args.id, args.at))
}

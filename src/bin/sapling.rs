use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::{Rng as _, SeedableRng as _};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sapling", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grow one tree and write the final frame (and optionally its cards) as PNG.
    Grow(GrowArgs),
    /// Grow several trees in forest mode and write the final frame as PNG.
    Forest(ForestArgs),
}

#[derive(Parser, Debug)]
struct StageArgs {
    /// Stage width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Stage height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Tree settings JSON (camelCase fields, missing fields use defaults).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Background image (any format the `image` crate decodes).
    #[arg(long)]
    background: Option<PathBuf>,

    /// Override the tree seed.
    #[arg(long)]
    seed: Option<i64>,

    /// Draw depth-sorted and depth-scaled trees.
    #[arg(long)]
    depth_mode: bool,

    /// Stop after this many ticks even if trees are still growing.
    #[arg(long, default_value_t = 20_000)]
    max_ticks: usize,

    /// Output PNG path for the composited frame.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct GrowArgs {
    #[command(flatten)]
    stage: StageArgs,

    /// Anchor U in [0,1] (fraction of the stage, or of the background image when present).
    #[arg(long, default_value_t = 0.5)]
    u: f64,

    /// Anchor V in [0,1].
    #[arg(long, default_value_t = 0.88)]
    v: f64,

    /// Draw a random seed instead of the configured one.
    #[arg(long)]
    auto_seed: bool,

    /// Grow the whole tree over this many seconds of 60 Hz ticks (uses a fresh seed).
    #[arg(long)]
    duration: Option<f64>,

    /// Title carried into the card of a timed tree.
    #[arg(long, requires = "duration")]
    title: Option<String>,

    /// Output path for the preview card PNG.
    #[arg(long)]
    card: Option<PathBuf>,

    /// Output path for the HD card PNG.
    #[arg(long)]
    hd_card: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ForestArgs {
    #[command(flatten)]
    stage: StageArgs,

    /// Number of trees to plant.
    #[arg(long, default_value_t = 5)]
    count: usize,

    /// Seed for tree positions and per-tree seeds.
    #[arg(long, default_value_t = 1)]
    layout_seed: u64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Grow(args) => cmd_grow(args),
        Command::Forest(args) => cmd_forest(args),
    }
}

fn read_settings_json(path: &Path) -> anyhow::Result<sapling::TreeSettings> {
    let f = File::open(path).with_context(|| format!("open settings '{}'", path.display()))?;
    let r = BufReader::new(f);
    let settings: sapling::TreeSettings =
        serde_json::from_reader(r).with_context(|| "parse settings JSON")?;
    Ok(settings)
}

fn make_engine(args: &StageArgs, auto_seed: bool) -> anyhow::Result<sapling::TreeEngine> {
    let mut settings = match &args.settings {
        Some(path) => read_settings_json(path)?,
        None => sapling::TreeSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = Some(seed);
    }
    settings.depth_mode |= args.depth_mode;

    let opts = sapling::EngineOpts {
        width: args.width,
        height: args.height,
        auto_seed,
        ..sapling::EngineOpts::default()
    };
    let mut engine = sapling::TreeEngine::new(opts)?.with_settings(settings);

    if let Some(path) = &args.background {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read background '{}'", path.display()))?;
        if !engine.load_background(&bytes) {
            eprintln!("background '{}' unusable, using flat color", path.display());
        }
    }
    Ok(engine)
}

fn run(engine: &mut sapling::TreeEngine, max_ticks: usize) -> anyhow::Result<()> {
    let ticks = engine.run_until_idle(max_ticks)?;
    if engine.loop_handle().is_some() {
        eprintln!("stopped after {ticks} ticks with trees still growing");
    } else {
        tracing::info!(ticks, "engine idle");
    }
    Ok(())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write png '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn write_frame(engine: &sapling::TreeEngine, out: &Path) -> anyhow::Result<()> {
    let frame = engine.frame_rgba()?;
    let png = sapling::encode_png(&frame)?;
    write_bytes(out, &png)
}

fn cmd_grow(args: GrowArgs) -> anyhow::Result<()> {
    let mut engine = make_engine(&args.stage, args.auto_seed)?;
    let anchor = if engine.space().image_active() {
        sapling::Anchor::Image {
            u: args.u,
            v: args.v,
        }
    } else {
        sapling::Anchor::Canvas {
            u: args.u,
            v: args.v,
        }
    };
    match args.duration {
        Some(secs) => {
            let duration = std::time::Duration::try_from_secs_f64(secs)
                .with_context(|| format!("invalid duration {secs}"))?;
            if engine.plant_timed(Some(anchor), duration, args.title).is_none() {
                anyhow::bail!("timed growth needs a duration above one second");
            }
        }
        None => {
            let at = engine.space().uv_to_canvas_xy(anchor);
            engine.plant(at, Some(anchor))?;
        }
    }
    run(&mut engine, args.stage.max_ticks)?;
    write_frame(&engine, &args.stage.out)?;

    for event in engine.drain_events() {
        let sapling::EngineEvent::TreeFinished(card) = event else {
            continue;
        };
        eprintln!(
            "finished '{}' (seed {})",
            card.title,
            card.seed.map_or_else(|| "random".to_owned(), |s| s.to_string())
        );
        if let Some(path) = &args.card {
            write_bytes(path, &card.preview_png)?;
        }
        if let (Some(path), Some(hd)) = (&args.hd_card, &card.hd_png) {
            write_bytes(path, hd)?;
        }
    }
    Ok(())
}

fn cmd_forest(args: ForestArgs) -> anyhow::Result<()> {
    let mut engine = make_engine(&args.stage, false)?;
    engine.set_forest_mode(true);

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.layout_seed);
    let stage_w = f64::from(args.stage.width);
    let stage_h = f64::from(args.stage.height);
    for _ in 0..args.count {
        let patch = sapling::SettingsPatch {
            seed: Some(Some(sapling::random_seed(&mut rng))),
            ..sapling::SettingsPatch::default()
        };
        engine.update_settings(&patch);
        let at = sapling::Point::new(
            rng.gen_range(0.1..0.9) * stage_w,
            rng.gen_range(0.55..0.95) * stage_h,
        );
        engine.plant(at, None)?;
    }
    run(&mut engine, args.stage.max_ticks)?;
    eprintln!("forest of {} trees", engine.forest().len());
    write_frame(&engine, &args.stage.out)
}

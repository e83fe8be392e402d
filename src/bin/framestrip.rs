use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

use framestrip::{
    Aggregate, AssetCatalog, Canvas, CatalogOpts, FrameIndex, FrameState, ItemInfo,
    ResourceRegistry, SourceFile, Store, TimelineOpts,
};

#[derive(Parser, Debug)]
#[command(name = "framestrip", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the timeline of a sequence or split as JSON.
    Timeline(TimelineArgs),
    /// Render one preview frame as a PNG.
    Frame(FrameArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Image files, in frame order.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Display name of the aggregate.
    #[arg(long, default_value = "preview")]
    name: String,

    /// Cut the single input image into X columns and Y rows instead of building a sequence.
    #[arg(long, num_args = 2, value_names = ["X", "Y"])]
    split: Option<Vec<u32>>,

    /// Mirror every frame horizontally.
    #[arg(long, default_value_t = false)]
    flip_x: bool,

    /// Timeline options JSON; missing fields keep their defaults.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Override decode worker threads.
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Args, Debug)]
struct TimelineArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Timeline(args) => cmd_timeline(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

struct Loaded {
    store: Store,
    aggregate: Aggregate,
    opts: TimelineOpts,
}

fn load(input: &InputArgs) -> anyhow::Result<Loaded> {
    let opts = match &input.opts {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("read timeline opts '{}'", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parse timeline opts '{}'", path.display()))?
        }
        None => TimelineOpts::default(),
    };
    opts.validate()?;

    let catalog = AssetCatalog::new(
        Arc::new(ResourceRegistry::new()),
        CatalogOpts {
            threads: input.threads,
        },
    )?;
    let files = input
        .files
        .iter()
        .map(SourceFile::from_path)
        .collect::<Result<Vec<_>, _>>()?;
    let assets = catalog
        .create_many(&files)
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    let mut info = ItemInfo::new(input.name.clone());
    info.flip_x = input.flip_x;
    let id = catalog.ids().aggregate();
    let aggregate = match input.split.as_deref() {
        Some(&[x, y]) => {
            let [source] = <[_; 1]>::try_from(assets)
                .map_err(|a| anyhow::anyhow!("--split takes exactly one image, got {}", a.len()))?;
            Aggregate::split(id, source, info).resplit(x, y, catalog.ids())?
        }
        Some(other) => anyhow::bail!("--split takes two values, got {}", other.len()),
        None => Aggregate::sequence(id, assets, info),
    };

    let store = Store::new(catalog);
    store.commit(aggregate.clone())?;
    Ok(Loaded {
        store,
        aggregate,
        opts,
    })
}

fn cmd_timeline(args: TimelineArgs) -> anyhow::Result<()> {
    let Loaded {
        store,
        aggregate,
        opts,
    } = load(&args.input)?;
    let report = serde_json::json!({
        "entry": store.listing().first(),
        "duration_frames": framestrip::duration_frames(aggregate.images().len(), &opts),
        "windows": framestrip::schedule(&aggregate, &opts)?,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let Loaded {
        store,
        aggregate,
        opts,
    } = load(&args.input)?;
    let frame = FrameIndex(args.frame);
    let state = FrameState {
        frame,
        time_secs: opts.fps.frames_to_secs(frame.0),
        layers: framestrip::evaluate_aggregate(&aggregate, frame, &opts)?,
    };

    let canvas = aggregate
        .images()
        .first()
        .map(|img| Canvas {
            width: img.crop.width().round() as u32,
            height: img.crop.height().round() as u32,
        })
        .context("aggregate has no frames")?;
    let rgba = framestrip::render_frame(&state, store.catalog().registry(), canvas)?.into_straight();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &rgba.data,
        rgba.width,
        rgba.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {} ({} layers)", args.out.display(), state.layers.len());
    Ok(())
}

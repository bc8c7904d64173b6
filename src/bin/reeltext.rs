use std::{
    fs::File,
    io::{BufReader, Read as _, Write as _},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "reeltext", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn text overlays into a video (requires `ffmpeg` on PATH).
    Export(ExportArgs),
    /// Rasterize one element as a frame-sized transparent PNG.
    Raster(RasterArgs),
    /// Print the staged files and engine command line an export would use.
    Plan(PlanArgs),
    /// Show which font face a family resolves to.
    Fonts(FontsArgs),
}

#[derive(clap::Args, Debug)]
struct GlobalArgs {
    /// Overlay frame size as `WxH`.
    #[arg(long, global = true)]
    frame: Option<String>,

    /// How the overlay frame relates to the source video size.
    #[arg(long, value_enum, global = true)]
    frame_policy: Option<PolicyChoice>,

    /// Rasterizer threads (default: one per core).
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Extra font directory (repeatable).
    #[arg(long = "font-dir", global = true)]
    font_dirs: Vec<PathBuf>,

    /// ffmpeg binary.
    #[arg(long, global = true)]
    ffmpeg: Option<PathBuf>,

    /// ffprobe binary.
    #[arg(long, global = true)]
    ffprobe: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Text element list JSON.
    #[arg(long)]
    elements: PathBuf,

    /// Source video: local path or http(s) URL.
    #[arg(long)]
    video: String,

    /// Output MP4 path.
    #[arg(long, conflicts_with = "out_dir")]
    out: Option<PathBuf>,

    /// Directory receiving a timestamped `text-overlay-*.mp4`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Do not print progress.
    #[arg(long)]
    quiet: bool,
}

#[derive(Parser, Debug)]
struct RasterArgs {
    /// Text element list JSON.
    #[arg(long)]
    elements: PathBuf,

    /// Element to draw: list index or element id.
    #[arg(long, default_value = "0")]
    element: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Text element list JSON.
    #[arg(long)]
    elements: PathBuf,

    /// Print the plan as JSON instead of a command line.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FontsArgs {
    /// CSS-style family list, e.g. `"Montserrat", sans-serif`.
    #[arg(long, default_value = "Arial")]
    family: String,

    #[arg(long)]
    bold: bool,

    #[arg(long)]
    italic: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Fixed,
    Strict,
    MatchSource,
}

impl From<PolicyChoice> for reeltext::FramePolicy {
    fn from(choice: PolicyChoice) -> Self {
        match choice {
            PolicyChoice::Fixed => Self::Fixed,
            PolicyChoice::Strict => Self::Strict,
            PolicyChoice::MatchSource => Self::MatchSource,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let opts = build_opts(&cli.global)?;
    match cli.cmd {
        Command::Export(args) => cmd_export(args, &cli.global, opts),
        Command::Raster(args) => cmd_raster(args, &opts),
        Command::Plan(args) => cmd_plan(args, &opts),
        Command::Fonts(args) => cmd_fonts(args, &opts),
    }
}

fn build_opts(global: &GlobalArgs) -> anyhow::Result<reeltext::ExportOpts> {
    let mut opts = reeltext::ExportOpts::from_env()?;
    if let Some(frame) = &global.frame {
        opts.frame = frame
            .parse()
            .with_context(|| format!("parse --frame '{frame}'"))?;
    }
    if let Some(policy) = global.frame_policy {
        opts.frame_policy = policy.into();
    }
    if global.threads.is_some() {
        opts.threads = global.threads;
    }
    opts.font_dirs.extend(global.font_dirs.iter().cloned());
    if let Some(ffmpeg) = &global.ffmpeg {
        opts.ffmpeg = ffmpeg.clone();
    }
    if let Some(ffprobe) = &global.ffprobe {
        opts.ffprobe = ffprobe.clone();
    }
    opts.validate()?;
    Ok(opts)
}

fn read_elements_json(path: &Path) -> anyhow::Result<Vec<reeltext::TextElement>> {
    let f = File::open(path).with_context(|| format!("open element list '{}'", path.display()))?;
    let mut json = String::new();
    BufReader::new(f)
        .read_to_string(&mut json)
        .with_context(|| format!("read element list '{}'", path.display()))?;
    Ok(reeltext::TextElement::list_from_json(&json)?)
}

fn font_book(opts: &reeltext::ExportOpts) -> Arc<reeltext::FontBook> {
    if opts.font_dirs.is_empty() {
        reeltext::FontBook::shared()
    } else {
        Arc::new(reeltext::FontBook::load(&opts.font_dirs))
    }
}

fn cmd_export(
    args: ExportArgs,
    global: &GlobalArgs,
    opts: reeltext::ExportOpts,
) -> anyhow::Result<()> {
    let elements = read_elements_json(&args.elements)?;
    let source = reeltext::VideoSource::parse(&args.video);

    let exporter = if global.ffmpeg.is_some() || global.ffprobe.is_some() {
        let engine = reeltext::FfmpegEngine::new(opts.ffmpeg.clone(), opts.ffprobe.clone());
        reeltext::Exporter::new(Arc::new(Mutex::new(engine)), opts)?
    } else {
        reeltext::Exporter::shared(opts)?
    };

    let on_progress: Option<reeltext::ProgressFn> = if args.quiet {
        None
    } else {
        Some(Box::new(|percent| {
            let mut err = std::io::stderr().lock();
            let _ = write!(err, "\rexporting {percent:>3}%");
            if percent == 100 {
                let _ = writeln!(err);
            }
            let _ = err.flush();
        }))
    };

    let blob = exporter
        .export(&source, &elements, on_progress)
        .with_context(|| format!("export '{}'", source.describe()))?;

    let written = match (&args.out, &args.out_dir) {
        (Some(out), _) => {
            blob.save_to(out)?;
            out.clone()
        }
        (None, Some(dir)) => blob.save_to_dir(dir)?,
        (None, None) => blob.save_to_dir(Path::new("."))?,
    };

    eprintln!("wrote {} ({} bytes, {})", written.display(), blob.len(), blob.mime);
    Ok(())
}

fn cmd_raster(args: RasterArgs, opts: &reeltext::ExportOpts) -> anyhow::Result<()> {
    let elements = read_elements_json(&args.elements)?;
    let element = match args.element.parse::<usize>() {
        Ok(index) => elements
            .get(index)
            .with_context(|| format!("element index {index} out of range ({})", elements.len()))?,
        Err(_) => elements
            .iter()
            .find(|e| e.id == args.element)
            .with_context(|| format!("no element with id '{}'", args.element))?,
    };

    let rasterizer = reeltext::OverlayRasterizer::new(font_book(opts));
    let raster = rasterizer.rasterize(element, opts.frame)?;
    let png = raster.to_png()?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, fingerprint {:016x})",
        args.out.display(),
        raster.width,
        raster.height,
        raster.fingerprint()
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs, opts: &reeltext::ExportOpts) -> anyhow::Result<()> {
    let elements = read_elements_json(&args.elements)?;
    let plan = reeltext::ExportPlan::new(opts.frame, &reeltext::visible_elements(&elements));

    if args.json {
        let json = serde_json::to_string_pretty(&plan).context("serialize export plan")?;
        println!("{json}");
    } else {
        for name in &plan.staged {
            println!("stage {name}");
        }
        println!("{}", plan.command_line(&opts.ffmpeg.display().to_string()));
    }
    Ok(())
}

fn cmd_fonts(args: FontsArgs, opts: &reeltext::ExportOpts) -> anyhow::Result<()> {
    let book = font_book(opts);
    eprintln!("font faces loaded: {}", book.face_count());

    let Some(font) = book.resolve(&args.family, args.bold, args.italic) else {
        anyhow::bail!("no font face available for '{}'", args.family);
    };
    println!("requested: {}", args.family);
    println!("family:    {}", font.family);
    println!("weight:    {}", font.weight);
    println!("italic:    {}", font.italic);
    println!("index:     {}", font.index);
    println!("fallback:  {}", font.fallback);
    println!(
        "xxh3:      {:016x}",
        xxhash_rust::xxh3::xxh3_64(font.data.as_slice())
    );
    Ok(())
}

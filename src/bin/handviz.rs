use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use handviz::{
    BatchReport, BlenderHost, DynamicVisualizer, ExportFormat, Hand, StaticVisualizer,
    VisualizerConfig, WACH_FIELD_COUNT,
};

#[derive(Parser, Debug)]
#[command(name = "handviz", version)]
struct Cli {
    /// Visualizer config JSON. Missing keys keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Blender executable; skips discovery.
    #[arg(long, global = true)]
    blender: Option<PathBuf>,

    /// Log per-sample progress to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export one pose per sample of a WACH `.txt` file.
    Static(StaticArgs),
    /// Export a single pose given as 20 values.
    Sample(SampleArgs),
    /// Animate every gesture instance of a JSON recording.
    Dynamic(DynamicArgs),
    /// Print the host script a run would use, without launching the host.
    Script(ScriptArgs),
}

#[derive(Parser, Debug)]
struct StaticArgs {
    /// Input WACH file.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long, default_value_t = ExportFormat::Stl)]
    format: ExportFormat,

    /// Also render and crop a PNG still per sample.
    #[arg(long)]
    png: bool,

    /// Overrides `static_output_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Run samples concurrently.
    #[arg(long)]
    parallel: bool,

    /// Worker threads for `--parallel` (default: rayon's choice).
    #[arg(long)]
    threads: Option<usize>,
}

#[derive(Parser, Debug)]
struct SampleArgs {
    #[arg(long)]
    label: String,

    #[arg(long)]
    hand: Hand,

    /// Twenty normalized values in WACH field order.
    #[arg(long, num_args = WACH_FIELD_COUNT, allow_hyphen_values = true, required = true)]
    values: Vec<String>,

    #[arg(long, default_value_t = ExportFormat::Stl)]
    format: ExportFormat,

    #[arg(long)]
    png: bool,

    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct DynamicArgs {
    /// Input gesture JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Open each instance in the Blender UI instead of saving `.blend` files.
    #[arg(long)]
    interactive: bool,

    /// Overrides `dynamic_output_dir`.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// WACH `.txt` or gesture `.json` input.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Sample (static) or gesture instance (dynamic) to render.
    #[arg(long, default_value_t = 0)]
    index: usize,

    /// Export format for static inputs.
    #[arg(long, default_value_t = ExportFormat::Stl)]
    format: ExportFormat,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => VisualizerConfig::from_path(path)?,
        None => VisualizerConfig::default(),
    };
    if cli.blender.is_some() {
        config.blender_path = cli.blender.clone();
    }

    match cli.cmd {
        Command::Static(args) => cmd_static(config, args),
        Command::Sample(args) => cmd_sample(config, args),
        Command::Dynamic(args) => cmd_dynamic(config, args),
        Command::Script(args) => cmd_script(config, args),
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn cmd_static(mut config: VisualizerConfig, args: StaticArgs) -> anyhow::Result<()> {
    config.export_png |= args.png;
    config.parallel |= args.parallel;
    if args.threads.is_some() {
        config.threads = args.threads;
    }
    if let Some(dir) = args.out_dir {
        config.static_output_dir = dir;
    }

    let viz = StaticVisualizer::with_blender(config)?;
    let report = viz.visualize_file(&args.in_path, args.format)?;
    finish(&report)
}

fn cmd_sample(mut config: VisualizerConfig, args: SampleArgs) -> anyhow::Result<()> {
    config.export_png |= args.png;
    if let Some(dir) = args.out_dir {
        config.static_output_dir = dir;
    }

    let viz = StaticVisualizer::with_blender(config)?;
    let report = viz.visualize_sample(&args.label, args.hand, &args.values, args.format)?;
    finish(&report)
}

fn cmd_dynamic(mut config: VisualizerConfig, args: DynamicArgs) -> anyhow::Result<()> {
    if let Some(dir) = args.out_dir {
        config.dynamic_output_dir = dir;
    }

    let viz = DynamicVisualizer::with_blender(config)?;
    let report = viz.visualize_file(&args.in_path, !args.interactive)?;
    finish(&report)
}

fn cmd_script(config: VisualizerConfig, args: ScriptArgs) -> anyhow::Result<()> {
    // Rendering never launches the host, so an undiscovered executable is fine here.
    let host = BlenderHost::new(
        config
            .blender_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("blender")),
    );

    let script = match extension(&args.in_path).as_deref() {
        Some("txt") => {
            let doc = handviz::read_wach_file(&args.in_path)?;
            StaticVisualizer::new(config, host)?.render_script(&doc, args.index, args.format)?
        }
        Some("json") => {
            let set = handviz::read_gesture_file(&args.in_path)?;
            DynamicVisualizer::new(config, host)?.render_script(&set, args.index, true)?
        }
        _ => anyhow::bail!(
            "unsupported input '{}' (expected .txt or .json)",
            args.in_path.display()
        ),
    };

    print!("{}", script.source());
    Ok(())
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

fn finish(report: &BatchReport) -> anyhow::Result<()> {
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(paths) if paths.is_empty() => println!("[{}] ok", outcome.index),
            Ok(paths) => {
                for p in paths {
                    println!("[{}] wrote {}", outcome.index, p.display());
                }
            }
            Err(e) => println!("[{}] failed: {e}", outcome.index),
        }
        match &outcome.png {
            Some(Ok(png)) => println!("[{}] wrote {}", outcome.index, png.display()),
            Some(Err(e)) => println!("[{}] png post-processing failed: {e}", outcome.index),
            None => {}
        }
    }

    if !report.is_success() {
        let png_failures = report
            .outcomes
            .iter()
            .filter(|o| matches!(o.png, Some(Err(_))))
            .count();
        anyhow::bail!(
            "'{}' ({}): {} of {} runs failed, {png_failures} png steps failed",
            report.label,
            report.hand,
            report.failed(),
            report.outcomes.len()
        );
    }
    Ok(())
}

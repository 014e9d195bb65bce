use std::path::PathBuf;

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "layermotion", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the effects headlessly and print per-tick transforms as JSON lines.
    Simulate(SimulateArgs),
    /// Render the scene after a number of ticks as a PNG.
    Frame(FrameArgs),
    /// Submit an export job that renders a PNG sequence, then poll it to completion.
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 60)]
    ticks: u32,

    /// Tick rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Ticks to run before capturing.
    #[arg(long, default_value_t = 0)]
    ticks: u32,

    /// Tick rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input project JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving the PNG sequence.
    #[arg(long)]
    out_dir: PathBuf,

    #[arg(long, default_value_t = 60)]
    frames: u32,

    #[arg(long, default_value_t = 30.0)]
    fps: f64,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Export(args) => cmd_export(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn tick_dt(fps: f64) -> anyhow::Result<f64> {
    anyhow::ensure!(fps.is_finite() && fps > 0.0, "fps must be finite and > 0");
    Ok(1.0 / fps)
}

fn warn_unknown(report: &layermotion::TickReport) {
    let Some(rec) = &report.reconcile else {
        return;
    };
    for (layer, kind) in &rec.unknown_kinds {
        tracing::warn!(%layer, kind = %kind, "ignoring unknown effect kind");
    }
    for layer in &rec.unknown_layers {
        tracing::warn!(%layer, "ignoring settings for unknown layer");
    }
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let project = layermotion::Project::from_path(&args.in_path)?;
    let dt = tick_dt(args.fps)?;
    let store = project.build_store()?;

    let surface = layermotion::RecordingSurface::new().without_update_log();
    let mut engine = layermotion::Engine::mount(project.engine.clone(), surface)?;
    engine.submit_settings(project.settings.clone());

    for i in 0..args.ticks {
        let report = engine.tick(&store, if i == 0 { 0.0 } else { dt })?;
        warn_unknown(&report);
        let line = serde_json::json!({
            "frame": report.frame,
            "dt": report.dt,
            "transforms": report.transforms,
            "faults": report.faults,
        });
        println!("{}", serde_json::to_string(&line).context("serialize tick")?);
    }

    engine.unmount()?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let project = layermotion::Project::from_path(&args.in_path)?;
    let dt = tick_dt(args.fps)?;
    let store = project.build_store()?;

    let surface = layermotion::CpuSurface::new(project.engine.assets_root.clone());
    let mut engine = layermotion::Engine::mount(project.engine.clone(), surface)?;
    engine.submit_settings(project.settings.clone());

    for i in 0..=args.ticks {
        let report = engine.tick(&store, if i == 0 { 0.0 } else { dt })?;
        warn_unknown(&report);
    }
    let frame = engine
        .surface_mut()
        .take_frame()
        .context("surface presented no frame")?;
    engine.unmount()?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    layermotion::export::sequence::save_frame_png(&frame, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let project = layermotion::Project::from_path(&args.in_path)?;
    let request = project.export_request()?;

    let opts = layermotion::SequenceOpts {
        out_dir: args.out_dir,
        frames: args.frames,
        fps: args.fps,
    };
    let worker_project = project.clone();
    let queue = layermotion::InMemoryExportQueue::new(move |_req| {
        layermotion::render_sequence(&worker_project, &opts)
    });
    let mut client = layermotion::ExportClient::new(queue);

    let job = match client.request(&request)? {
        layermotion::ExportOutcome::Cached(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            return Ok(());
        }
        layermotion::ExportOutcome::Queued(job) => job,
    };
    tracing::debug!(%job, "export queued");

    client.backend_mut().run_pending();
    match client.poll(&job)? {
        layermotion::JobStatus::Finished(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        layermotion::JobStatus::Failed(reason) => anyhow::bail!("export job {job} failed: {reason}"),
        layermotion::JobStatus::Pending => anyhow::bail!("export job {job} did not run"),
    }
}

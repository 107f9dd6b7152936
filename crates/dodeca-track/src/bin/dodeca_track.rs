//! dodeca-track CLI: run the marker tracker over frame files.

use clap::{Args, Parser, Subcommand};
use dodeca_track::core::{init_with_level, Homography};
use dodeca_track::detect::{rgb_from_bgr, save_masks, track_rgb};
use dodeca_track::marker::descriptor::SPOT_COLORS;
use dodeca_track::marker::{render_face, FrameReport, TrackReport};
use dodeca_track::{FaceIndex, SpotTracker, TrackerConfig};
use log::{info, warn, LevelFilter};
use nalgebra::Matrix3;
use std::path::{Path, PathBuf};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "dodeca-track")]
#[command(about = "Track a colour-spot dodecahedron marker in image sequences")]
#[command(version)]
struct Cli {
    /// Log per-frame skip reasons.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process frames in order and write a JSON report.
    Detect(DetectArgs),

    /// Write the colour masks of one frame as PNG files.
    Masks(MasksArgs),

    /// Render a synthetic frame of one face.
    Render(RenderArgs),
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Tracker configuration (JSON).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Report path; defaults to the config's `output_path`.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Frames to process; replaces the config's frame list when given.
    frames: Vec<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct MasksArgs {
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    frame: PathBuf,
}

#[derive(Debug, Clone, Args)]
struct RenderArgs {
    /// Face number, 1..=12.
    #[arg(long)]
    face: u8,

    #[arg(long)]
    out: PathBuf,

    #[arg(long, default_value = "400")]
    size: u32,

    /// Pixels per millimetre.
    #[arg(long, default_value = "4.0")]
    scale: f64,

    /// In-plane turn, degrees.
    #[arg(long, default_value = "0.0")]
    angle: f64,
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    init_with_level(level)?;

    match cli.command {
        Commands::Detect(args) => run_detect(&args),
        Commands::Masks(args) => run_masks(&args),
        Commands::Render(args) => run_render(&args),
    }
}

fn load_config(path: Option<&Path>) -> CliResult<TrackerConfig> {
    match path {
        Some(p) => Ok(TrackerConfig::load_json(p)?),
        None => Ok(TrackerConfig::default()),
    }
}

fn run_detect(args: &DetectArgs) -> CliResult<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if !args.frames.is_empty() {
        cfg.frames = args
            .frames
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
    }
    if cfg.frames.is_empty() {
        return Err("no frames given".into());
    }

    let mut tracker = cfg.build_tracker();
    let config_path = args.config.clone().unwrap_or_default();
    let mut report = TrackReport::new(&config_path);
    for (i, frame_path) in cfg.frames.iter().enumerate() {
        if cfg.is_calibration_frame(i) {
            tracker.request_calibration_sample();
        }
        let img = image::open(frame_path)?.to_rgb8();
        let mut entry = FrameReport::new(frame_path.as_str());
        match track_rgb(&mut tracker, &img) {
            Ok(det) => entry.set_result(Ok(det)),
            Err(dodeca_track::detect::TrackError::Detect(err)) => entry.set_result(Err(err)),
            Err(err) => return Err(err.into()),
        }
        report.frames.push(entry);
    }

    let out = args.out.clone().unwrap_or_else(|| cfg.output_path());
    report.write_json(&out)?;
    info!(
        "{} of {} frames detected, report written to {}",
        report.detected(),
        report.frames.len(),
        out.display()
    );
    Ok(())
}

fn run_masks(args: &MasksArgs) -> CliResult<()> {
    let cfg = load_config(args.config.as_deref())?;
    let mut tracker: SpotTracker = cfg.build_tracker();
    let img = image::open(&args.frame)?.to_rgb8();
    if let Err(err) = track_rgb(&mut tracker, &img) {
        warn!("{}: {err}", args.frame.display());
    }
    let Some(masks) = tracker.masks() else {
        return Err("no masks computed".into());
    };
    std::fs::create_dir_all(&args.out)?;
    for path in save_masks(masks, &args.out)? {
        info!("wrote {}", path.display());
    }
    Ok(())
}

fn run_render(args: &RenderArgs) -> CliResult<()> {
    let face = FaceIndex::new(args.face).ok_or("face must be within 1..=12")?;
    let (s, c) = args.angle.to_radians().sin_cos();
    let centre = args.size as f64 / 2.0;
    let h = Homography::new(Matrix3::new(
        args.scale * c, -args.scale * s, centre, //
        args.scale * s, args.scale * c, centre, //
        0.0, 0.0, 1.0,
    ));
    let size = args.size as usize;
    let frame = render_face(size, size, &h, face, &SPOT_COLORS);
    rgb_from_bgr(&frame).save(&args.out)?;
    info!("face {} written to {}", face.get(), args.out.display());
    Ok(())
}

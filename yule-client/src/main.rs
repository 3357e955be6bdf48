use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

use yule_client::{
    run_frames, spawn_gesture_feed, LandmarkSource, LogAudio, RunOptions, ScriptedHand,
    SimulatedHand,
};
use yule_core::{MusicPlayer, PhotoQueue, Scene};
use yule_gesture::GestureClassifier;
use yule_shared::{GestureThresholds, Palette, SceneSettings};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless yule scene driven by hand gestures", long_about = None)]
struct Args {
    /// JSON file with scene settings; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file with gesture thresholds
    #[arg(long)]
    thresholds: Option<PathBuf>,

    /// Render frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Hand capture frames per second
    #[arg(long, default_value_t = 30.0)]
    capture_rate: f32,

    /// Stop after this many seconds (runs until Ctrl-C otherwise)
    #[arg(short, long)]
    seconds: Option<f64>,

    /// Photo references to upload, oldest first
    #[arg(short, long, num_args = 1..)]
    photos: Vec<String>,

    /// Music track to load and start
    #[arg(short, long)]
    music: Option<String>,

    /// Replay hand frames from a JSON script instead of the simulated hand
    #[arg(long)]
    script: Option<PathBuf>,

    /// Capture frames each simulated pose is held for
    #[arg(long, default_value_t = 90)]
    hold: u64,

    /// Write the final frame as JSON
    #[arg(long)]
    dump: Option<PathBuf>,

    /// Tree color, overriding the settings file
    #[arg(long, value_enum)]
    palette: Option<TreeColor>,

    /// Viewport size as WIDTHxHEIGHT
    #[arg(long)]
    viewport: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum TreeColor {
    ClassicPine,
    SantaRed,
    Gold,
    Snow,
}

impl From<TreeColor> for Palette {
    fn from(color: TreeColor) -> Self {
        match color {
            TreeColor::ClassicPine => Palette::ClassicPine,
            TreeColor::SantaRed => Palette::SantaRed,
            TreeColor::Gold => Palette::Gold,
            TreeColor::Snow => Palette::Snow,
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn parse_viewport(value: &str) -> Result<(f32, f32)> {
    let (width, height) = value
        .split_once('x')
        .context("Viewport must look like 1280x720")?;
    Ok((
        width.trim().parse().context("Invalid viewport width")?,
        height.trim().parse().context("Invalid viewport height")?,
    ))
}

fn run_duration(seconds: Option<f64>) -> Result<Option<Duration>> {
    seconds
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("Invalid --seconds")
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    log::info!("Yule scene starting...");

    let settings: SceneSettings = match &args.config {
        Some(path) => read_json(path)?,
        None => SceneSettings::default(),
    };
    let thresholds: GestureThresholds = match &args.thresholds {
        Some(path) => read_json(path)?,
        None => GestureThresholds::default(),
    };

    log::info!(
        "{} particles, {} ornaments, {} gifts",
        settings.counts.particles,
        settings.counts.ornaments,
        settings.counts.gifts
    );
    let mut scene = Scene::new(settings);
    if let Some(viewport) = &args.viewport {
        let (width, height) = parse_viewport(viewport)?;
        scene.set_viewport(width, height);
    }
    if let Some(color) = args.palette {
        let palette = Palette::from(color);
        scene.set_palette(palette);
        log::info!("Tree color: {}", palette.label());
    }

    let mut photos = PhotoQueue::new();
    if !args.photos.is_empty() {
        let dropped = photos.upload(args.photos.iter().cloned());
        if dropped > 0 {
            log::warn!("Only the latest {} photos are kept, dropped {}", photos.len(), dropped);
        }
        log::info!("{} photos loaded", photos.len());
    }

    let mut player = MusicPlayer::new(LogAudio::new());
    if let Some(track) = &args.music {
        player.load(track.as_str());
    }

    let source: Box<dyn LandmarkSource> = match &args.script {
        Some(path) => Box::new(ScriptedHand::from_path(path)?),
        None => Box::new(SimulatedHand::new(args.hold)),
    };
    log::info!("Hand source: {}", source.name());

    let classifier = GestureClassifier::new().with_thresholds(thresholds);
    let feed = spawn_gesture_feed(source, classifier, args.capture_rate);

    let options = RunOptions {
        fps: args.fps,
        duration: run_duration(args.seconds)?,
        max_frames: None,
    };
    let report = run_frames(&mut scene, &feed, &photos, &player, &options)
        .await
        .context("Frame loop error")?;

    let captured = feed.stop().await.context("Hand capture failed")?;
    log::info!(
        "Stopped after {} frames, {} hand frames, {} mode changes",
        report.status.frame,
        captured,
        report.transitions.len()
    );
    println!("{}", serde_json::to_string_pretty(&report.status)?);

    if let Some(path) = &args.dump {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &scene.frame().snapshot())
            .context("Failed to write frame dump")?;
        log::info!("Final frame written to {}", path.display());
    }

    Ok(())
}

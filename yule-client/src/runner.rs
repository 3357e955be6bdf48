use anyhow::Result;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

use yule_core::{AudioOutput, MusicPlayer, PhotoQueue, Scene, VisualMode};
use yule_shared::{HandSample, SceneStatus};

use crate::feed::GestureFeed;

/// Longest frame step fed to the scene, so a stall does not teleport entities
const MAX_STEP: f32 = 0.1;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub fps: u32,
    /// Stop after this much wall time
    pub duration: Option<Duration>,
    /// Stop after this many frames of this run
    pub max_frames: Option<u64>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            fps: 60,
            duration: None,
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub status: SceneStatus,
    /// Every mode the scene switched into, in order
    pub transitions: Vec<VisualMode>,
}

pub fn status<A: AudioOutput>(
    scene: &Scene,
    sample: &HandSample,
    photos: &PhotoQueue,
    player: &MusicPlayer<A>,
) -> SceneStatus {
    SceneStatus {
        mode: scene.mode(),
        frame: scene.frames(),
        photo_count: photos.len(),
        hand_present: sample.present,
        gesture: sample.gesture,
        music_playing: player.is_playing(),
    }
}

/// Drive the scene at `options.fps` from the latest published hand sample
/// until the duration or frame budget runs out, or Ctrl-C
pub async fn run_frames<A: AudioOutput>(
    scene: &mut Scene,
    feed: &GestureFeed,
    photos: &PhotoQueue,
    player: &MusicPlayer<A>,
    options: &RunOptions,
) -> Result<RunReport> {
    let fps = options.fps.max(1);
    let mut ticker = time::interval(Duration::from_secs_f64(1.0 / fps as f64));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let started = Instant::now();
    let mut last = started;
    let mut transitions = Vec::new();
    let mut frames = 0u64;
    let mut sample = HandSample::absent();
    let mut feed_lost = false;

    log::info!("Running scene at {} fps", fps);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut ctrl_c => {
                log::info!("Interrupted");
                break;
            }
        }

        let now = Instant::now();
        let dt = now.duration_since(last).as_secs_f32().min(MAX_STEP);
        last = now;

        frames += 1;
        if !feed_lost && feed.is_closed() {
            log::warn!("Hand capture stopped, scene continues without a hand");
            feed_lost = true;
        }
        sample = feed.latest();
        if let Some(mode) = scene.tick(&sample, photos, dt) {
            log::info!("Mode changed to {:?} on {:?}", mode, sample.gesture);
            transitions.push(mode);
        }

        if scene.frames() % fps as u64 == 0 {
            log::debug!("{:?}", status(scene, &sample, photos, player));
        }

        if options.max_frames.is_some_and(|max| frames >= max) {
            break;
        }
        if options.duration.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
    }

    Ok(RunReport {
        status: status(scene, &sample, photos, player),
        transitions,
    })
}

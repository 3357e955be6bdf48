use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use yule_gesture::GestureClassifier;
use yule_shared::HandSample;

use crate::source::{CaptureSession, LandmarkSource};

/// Handle to a running capture + classify task.
///
/// The render side only ever sees the most recent sample; frames it did not
/// get to are overwritten, never queued. Dropping the handle stops the task,
/// which drops its [`CaptureSession`] and releases the device
pub struct GestureFeed {
    samples: watch::Receiver<HandSample>,
    stop: Arc<AtomicBool>,
    task: Option<JoinHandle<Result<u64>>>,
}

impl GestureFeed {
    /// Latest classified sample, absent until the first frame arrives
    pub fn latest(&self) -> HandSample {
        self.samples.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<HandSample> {
        self.samples.clone()
    }

    /// True once the capture task has ended, for any reason
    pub fn is_closed(&self) -> bool {
        self.samples.has_changed().is_err()
    }

    /// Stop capturing and wait for the session to close. Returns the number
    /// of frames classified
    pub async fn stop(mut self) -> Result<u64> {
        self.stop.store(true, Ordering::SeqCst);
        match self.task.take() {
            Some(task) => task.await.context("Gesture feed task panicked")?,
            None => Ok(0),
        }
    }
}

impl Drop for GestureFeed {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
    }
}

/// Publishes a no-hand sample when dropped, so a dead producer reads as an
/// absent hand instead of freezing on its last frame
struct AbsentOnExit(watch::Sender<HandSample>);

impl Drop for AbsentOnExit {
    fn drop(&mut self) {
        self.0.send_replace(HandSample::absent());
    }
}

/// Run `source` through `classifier` on a blocking task, at most
/// `capture_rate` frames per second. At least one frame is captured before
/// a stop request is honoured
pub fn spawn_gesture_feed<S: LandmarkSource>(
    source: S,
    classifier: GestureClassifier,
    capture_rate: f32,
) -> GestureFeed {
    let (tx, rx) = watch::channel(HandSample::absent());
    let stop = Arc::new(AtomicBool::new(false));
    let running = stop.clone();
    let period = Duration::from_secs_f32(1.0 / capture_rate.max(1.0));

    let task = tokio::task::spawn_blocking(move || -> Result<u64> {
        let publisher = AbsentOnExit(tx);
        let mut session = CaptureSession::open(source)?;
        let mut classified = 0u64;

        loop {
            let started = Instant::now();
            let landmarks = session.next_frame()?;
            let sample = classifier.classify(landmarks.as_ref());
            classified += 1;

            if publisher.0.send(sample).is_err() {
                log::debug!("No frame loop listening, stopping capture");
                break;
            }
            if running.load(Ordering::SeqCst) {
                break;
            }

            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }

        Ok(classified)
    });

    GestureFeed {
        samples: rx,
        stop,
        task: Some(task),
    }
}

use anyhow::{bail, Context, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use yule_shared::{
    Gesture, HandLandmarks, Position, INDEX_TIP, LANDMARK_COUNT, MIDDLE_TIP, PINKY_TIP, RING_TIP,
    THUMB_TIP,
};

/// Anything that produces hand landmarks, one camera frame at a time
pub trait LandmarkSource: Send + 'static {
    /// Block until the next frame. `Ok(None)` means no hand in that frame
    fn next_frame(&mut self) -> Result<Option<HandLandmarks>>;

    fn name(&self) -> &str;

    /// Claim the underlying device
    fn acquire(&mut self) -> Result<()> {
        Ok(())
    }

    fn release(&mut self) {}
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn next_frame(&mut self) -> Result<Option<HandLandmarks>> {
        (**self).next_frame()
    }

    fn name(&self) -> &str {
        (**self).name()
    }

    fn acquire(&mut self) -> Result<()> {
        (**self).acquire()
    }

    fn release(&mut self) {
        (**self).release()
    }
}

/// Holds a source's device for as long as it lives. Any exit path,
/// including an error unwinding out of the capture loop, releases it
pub struct CaptureSession<S: LandmarkSource> {
    source: S,
    frames: u64,
}

impl<S: LandmarkSource> CaptureSession<S> {
    pub fn open(mut source: S) -> Result<Self> {
        source
            .acquire()
            .with_context(|| format!("Failed to open capture source {}", source.name()))?;
        log::info!("Capture started on {}", source.name());
        Ok(Self { source, frames: 0 })
    }

    pub fn next_frame(&mut self) -> Result<Option<HandLandmarks>> {
        self.frames += 1;
        self.source.next_frame()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl<S: LandmarkSource> Drop for CaptureSession<S> {
    fn drop(&mut self) {
        self.source.release();
        log::info!(
            "Capture on {} released after {} frames",
            self.source.name(),
            self.frames
        );
    }
}

const WRIST_Y: f32 = 0.8;

/// Build a hand that classifies as `gesture` with default thresholds.
/// `Gesture::None` gives a half-curled, ambiguous hand
pub fn posed_hand(gesture: Gesture, wrist_x: f32) -> HandLandmarks {
    // (index reach, thumb to index gap, reach of the other three)
    let (reach, pinch, others) = match gesture {
        Gesture::Open => (0.35, 0.2, 0.35),
        Gesture::Closed => (0.1, 0.15, 0.1),
        Gesture::Ok => (0.3, 0.02, 0.3),
        Gesture::Pinch => (0.3, 0.02, 0.1),
        Gesture::None => (0.21, 0.2, 0.21),
    };

    let mut points = [Position::new(wrist_x, WRIST_Y); LANDMARK_COUNT];
    points[INDEX_TIP] = Position::new(wrist_x - 0.1, WRIST_Y - reach);
    points[THUMB_TIP] = Position::new(wrist_x - 0.1 + pinch, WRIST_Y - reach);
    for tip in [MIDDLE_TIP, RING_TIP, PINKY_TIP] {
        points[tip] = Position::new(wrist_x, WRIST_Y - others);
    }
    HandLandmarks::new(points)
}

/// Order the simulated hand walks through; `None` is a frame without a hand
pub const SIMULATED_POSES: [Option<Gesture>; 5] = [
    Some(Gesture::Open),
    Some(Gesture::Closed),
    Some(Gesture::Ok),
    Some(Gesture::Pinch),
    None,
];

/// Synthetic hand cycling through every pose while sweeping sideways
pub struct SimulatedHand {
    frame: u64,
    frames_per_pose: u64,
    device: Arc<AtomicBool>,
}

impl SimulatedHand {
    pub fn new(frames_per_pose: u64) -> Self {
        Self {
            frame: 0,
            frames_per_pose: frames_per_pose.max(1),
            device: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag that is set while a session holds this source
    pub fn device_flag(&self) -> Arc<AtomicBool> {
        self.device.clone()
    }

    pub fn pose_at(&self, frame: u64) -> Option<Gesture> {
        let index = (frame / self.frames_per_pose) as usize % SIMULATED_POSES.len();
        SIMULATED_POSES[index]
    }
}

impl LandmarkSource for SimulatedHand {
    fn next_frame(&mut self) -> Result<Option<HandLandmarks>> {
        let frame = self.frame;
        self.frame += 1;

        let sweep = 0.5 + 0.25 * (frame as f32 * 0.05).sin();
        Ok(self.pose_at(frame).map(|gesture| posed_hand(gesture, sweep)))
    }

    fn name(&self) -> &str {
        "simulated hand"
    }

    fn acquire(&mut self) -> Result<()> {
        if self.device.swap(true, Ordering::SeqCst) {
            bail!("device already in use");
        }
        Ok(())
    }

    fn release(&mut self) {
        self.device.store(false, Ordering::SeqCst);
    }
}

/// Replays recorded frames in a loop. Each frame is either `null` (no hand)
/// or a list of 21 `[x, y]` points in normalized image coordinates
pub struct ScriptedHand {
    frames: Vec<Option<Vec<[f32; 2]>>>,
    cursor: usize,
    label: String,
}

impl ScriptedHand {
    pub fn from_frames(frames: Vec<Option<Vec<[f32; 2]>>>) -> Result<Self> {
        if frames.is_empty() {
            bail!("hand script has no frames");
        }
        Ok(Self {
            frames,
            cursor: 0,
            label: "script".to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let frames = serde_json::from_str(json).context("Invalid hand script")?;
        Self::from_frames(frames)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read hand script {}", path.display()))?;
        let mut script = Self::from_json(&json)?;
        script.label = path.display().to_string();
        Ok(script)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl LandmarkSource for ScriptedHand {
    fn next_frame(&mut self) -> Result<Option<HandLandmarks>> {
        let index = self.cursor;
        self.cursor = (self.cursor + 1) % self.frames.len();

        let Some(points) = &self.frames[index] else {
            return Ok(None);
        };
        match yule_gesture::landmarks_from_points(points) {
            Some(hand) => Ok(Some(hand)),
            None => {
                log::warn!(
                    "Script frame {} has {} points, expected {}",
                    index,
                    points.len(),
                    LANDMARK_COUNT
                );
                Ok(None)
            }
        }
    }

    fn name(&self) -> &str {
        &self.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yule_gesture::GestureClassifier;

    #[test]
    fn test_posed_hands_classify_as_posed() {
        let classifier = GestureClassifier::new();
        for gesture in [
            Gesture::Open,
            Gesture::Closed,
            Gesture::Ok,
            Gesture::Pinch,
            Gesture::None,
        ] {
            for x in [0.3, 0.5, 0.7] {
                assert_eq!(classifier.gesture(&posed_hand(gesture, x)), gesture);
            }
        }
    }

    #[test]
    fn test_simulated_hand_cycles() {
        let mut hand = SimulatedHand::new(2);
        let classifier = GestureClassifier::new();
        let seen: Vec<Option<Gesture>> = (0..10)
            .map(|_| {
                hand.next_frame()
                    .unwrap()
                    .map(|h| classifier.gesture(&h))
            })
            .collect();

        assert_eq!(seen[0], Some(Gesture::Open));
        assert_eq!(seen[2], Some(Gesture::Closed));
        assert_eq!(seen[4], Some(Gesture::Ok));
        assert_eq!(seen[6], Some(Gesture::Pinch));
        assert_eq!(seen[8], None);
        assert_eq!(hand.pose_at(10), Some(Gesture::Open));
    }

    #[test]
    fn test_session_releases_device_on_drop() {
        let hand = SimulatedHand::new(1);
        let flag = hand.device_flag();
        {
            let mut session = CaptureSession::open(hand).unwrap();
            assert!(flag.load(Ordering::SeqCst));
            session.next_frame().unwrap();
            assert_eq!(session.frames(), 1);
        }
        assert!(!flag.load(Ordering::SeqCst));
    }

    #[test]
    fn test_busy_device_refuses_second_session() {
        let mut hand = SimulatedHand::new(1);
        hand.acquire().unwrap();
        assert!(CaptureSession::open(hand).is_err());
    }

    #[test]
    fn test_script_loops_and_skips_short_frames() {
        let full: Vec<[f32; 2]> = vec![[0.5, 0.5]; LANDMARK_COUNT];
        let json = serde_json::to_string(&vec![Some(full), None, Some(vec![[0.1, 0.1]])]).unwrap();
        let mut script = ScriptedHand::from_json(&json).unwrap();
        assert_eq!(script.len(), 3);

        assert!(script.next_frame().unwrap().is_some());
        assert!(script.next_frame().unwrap().is_none());
        assert!(script.next_frame().unwrap().is_none());
        assert!(script.next_frame().unwrap().is_some());
    }

    #[test]
    fn test_empty_script_is_rejected() {
        assert!(ScriptedHand::from_json("[]").is_err());
        assert!(ScriptedHand::from_json("{not json").is_err());
    }
}

//! Headless host for the yule scene: hand landmark sources, the gesture
//! feed that classifies them off the render loop, and the frame runner.

pub mod audio;
pub mod feed;
pub mod runner;
pub mod source;

pub use audio::LogAudio;
pub use feed::{spawn_gesture_feed, GestureFeed};
pub use runner::{run_frames, RunOptions, RunReport};
pub use source::{CaptureSession, LandmarkSource, ScriptedHand, SimulatedHand};

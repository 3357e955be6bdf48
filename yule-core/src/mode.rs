//! Gesture-driven visual mode state machine.

use yule_shared::{Gesture, HandSample, VisualMode};

/// Mode requested by a gesture, `None` for gestures that keep the current mode
pub fn mode_for(gesture: Gesture) -> Option<VisualMode> {
    match gesture {
        Gesture::Closed => Some(VisualMode::Saturn),
        Gesture::Open => Some(VisualMode::Tree),
        Gesture::Ok => Some(VisualMode::Heart),
        Gesture::Pinch => Some(VisualMode::Galaxy),
        Gesture::None => None,
    }
}

/// Holds the active mode. Only an explicit, different gesture from a present
/// hand changes it; absence or ambiguity freezes it indefinitely
#[derive(Debug, Clone, Default)]
pub struct ModeController {
    current: VisualMode,
}

impl ModeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> VisualMode {
        self.current
    }

    /// Feed one classifier output. Returns the new mode when it changed
    pub fn apply(&mut self, sample: &HandSample) -> Option<VisualMode> {
        if !sample.present {
            return None;
        }

        let requested = mode_for(sample.gesture)?;
        if requested == self.current {
            return None;
        }

        log::debug!("visual mode {:?} -> {:?}", self.current, requested);
        self.current = requested;
        Some(requested)
    }
}

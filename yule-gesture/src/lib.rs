#![cfg_attr(not(feature = "std"), no_std)]

//! Gesture classification for the yule scene
//! Turns one frame of 21 hand landmarks into a discrete gesture plus cursor
//! Holds no state between frames; flicker at threshold boundaries is damped
//! by the mode controller downstream

use yule_shared::{
    Gesture, GestureThresholds, HandLandmarks, HandSample, Position, INDEX_TIP, LANDMARK_COUNT,
    MIDDLE_TIP, PINKY_TIP, RING_TIP,
};

/// Fingers considered when deciding between open and closed
const REACH_TIPS: [usize; 4] = [INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Fingers that must be extended for a pinch to read as OK
const OK_TIPS: [usize; 3] = [MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Build landmarks from raw `[x, y]` pairs as delivered by the tracking model.
/// Returns `None` when fewer than 21 points are supplied
pub fn landmarks_from_points(points: &[[f32; 2]]) -> Option<HandLandmarks> {
    if points.len() < LANDMARK_COUNT {
        return None;
    }

    let mut landmarks = [Position::default(); LANDMARK_COUNT];
    for (slot, point) in landmarks.iter_mut().zip(points.iter()) {
        *slot = Position::new(point[0], point[1]);
    }
    Some(HandLandmarks::new(landmarks))
}

/// Rule-based hand pose classifier
#[derive(Debug, Clone)]
pub struct GestureClassifier {
    thresholds: GestureThresholds,
}

impl GestureClassifier {
    pub fn new() -> Self {
        Self {
            thresholds: GestureThresholds::default(),
        }
    }

    pub fn with_thresholds(mut self, thresholds: GestureThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_pinch_threshold(mut self, threshold: f32) -> Self {
        self.thresholds.pinch = threshold;
        self
    }

    pub fn with_extended_threshold(mut self, threshold: f32) -> Self {
        self.thresholds.extended = threshold;
        self
    }

    pub fn with_closed_threshold(mut self, threshold: f32) -> Self {
        self.thresholds.closed = threshold;
        self
    }

    pub fn with_open_threshold(mut self, threshold: f32) -> Self {
        self.thresholds.open = threshold;
        self
    }

    pub fn thresholds(&self) -> &GestureThresholds {
        &self.thresholds
    }

    /// Classify the pose of a detected hand
    pub fn gesture(&self, hand: &HandLandmarks) -> Gesture {
        let t = &self.thresholds;

        // Pinch takes priority over open/closed
        if hand.pinch_distance() < t.pinch {
            let others_extended = OK_TIPS.iter().all(|&tip| hand.reach(tip) > t.extended);
            return if others_extended {
                Gesture::Ok
            } else {
                Gesture::Pinch
            };
        }

        let average_reach =
            REACH_TIPS.iter().map(|&tip| hand.reach(tip)).sum::<f32>() / REACH_TIPS.len() as f32;

        if average_reach < t.closed {
            Gesture::Closed
        } else if average_reach > t.open {
            Gesture::Open
        } else {
            // Between the two thresholds the pose is ambiguous
            Gesture::None
        }
    }

    /// Process one camera frame. `None` means no hand was detected
    pub fn classify(&self, hand: Option<&HandLandmarks>) -> HandSample {
        let Some(hand) = hand else {
            return HandSample::absent();
        };

        HandSample {
            present: true,
            gesture: self.gesture(hand),
            cursor: hand.index_tip().mirrored(),
            pinch_distance: hand.pinch_distance(),
            fingertips: Some(hand.fingertips().map(|tip| tip.mirrored())),
        }
    }
}

impl Default for GestureClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yule_shared::{THUMB_TIP, WRIST};

    /// Wrist at the bottom centre, all tips `reach` straight above it,
    /// thumb and index `pinch` apart
    fn hand(reach: f32, pinch: f32) -> HandLandmarks {
        let wrist = Position::new(0.5, 0.9);
        let mut points = [wrist; LANDMARK_COUNT];
        for tip in REACH_TIPS {
            points[tip] = Position::new(0.5, 0.9 - reach);
        }
        points[INDEX_TIP] = Position::new(0.4, 0.9 - reach);
        points[THUMB_TIP] = Position::new(0.4 + pinch, 0.9 - reach);
        points[WRIST] = wrist;
        HandLandmarks::new(points)
    }

    #[test]
    fn test_no_hand_is_neutral() {
        let sample = GestureClassifier::new().classify(None);
        assert_eq!(sample, HandSample::absent());
    }

    #[test]
    fn test_ok_when_pinching_with_fingers_extended() {
        let classifier = GestureClassifier::new();
        let sample = classifier.classify(Some(&hand(0.35, 0.0)));
        assert!(sample.present);
        assert_eq!(sample.gesture, Gesture::Ok);
        assert_eq!(sample.pinch_distance, 0.0);
    }

    #[test]
    fn test_pinch_when_other_fingers_curled() {
        let classifier = GestureClassifier::new();
        assert_eq!(classifier.gesture(&hand(0.1, 0.02)), Gesture::Pinch);
    }

    #[test]
    fn test_closed_fist() {
        let classifier = GestureClassifier::new();
        // Thumb kept apart so the pinch rule does not fire
        assert_eq!(classifier.gesture(&hand(0.08, 0.15)), Gesture::Closed);
    }

    #[test]
    fn test_all_tips_near_wrist_without_pinch_is_closed() {
        let wrist = Position::new(0.5, 0.5);
        let mut points = [wrist; LANDMARK_COUNT];
        points[THUMB_TIP] = Position::new(0.59, 0.5);
        points[INDEX_TIP] = Position::new(0.5, 0.41);
        points[MIDDLE_TIP] = Position::new(0.41, 0.5);
        points[RING_TIP] = Position::new(0.5, 0.59);
        points[PINKY_TIP] = Position::new(0.44, 0.44);
        let landmarks = HandLandmarks::new(points);
        assert!(landmarks.pinch_distance() >= 0.08);
        assert_eq!(GestureClassifier::new().gesture(&landmarks), Gesture::Closed);
    }

    #[test]
    fn test_open_hand() {
        let classifier = GestureClassifier::new();
        assert_eq!(classifier.gesture(&hand(0.3, 0.2)), Gesture::Open);
    }

    #[test]
    fn test_ambiguous_pose_is_none() {
        let classifier = GestureClassifier::new();
        assert_eq!(classifier.gesture(&hand(0.21, 0.2)), Gesture::None);
    }

    #[test]
    fn test_cursor_is_mirrored_index_tip() {
        let classifier = GestureClassifier::new();
        let sample = classifier.classify(Some(&hand(0.3, 0.2)));
        assert!((sample.cursor.x - 0.6).abs() < 1e-6);
        assert!((sample.cursor.y - 0.6).abs() < 1e-6);

        let tips = sample.fingertips.unwrap();
        assert!((tips[1].x - 0.6).abs() < 1e-6);
        assert!((tips[0].x - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_pinch_threshold_is_tunable() {
        let strict = GestureClassifier::new().with_pinch_threshold(0.01);
        // 0.02 apart: a pinch by default, open with the stricter threshold
        assert_eq!(GestureClassifier::new().gesture(&hand(0.35, 0.02)), Gesture::Ok);
        assert_eq!(strict.gesture(&hand(0.35, 0.02)), Gesture::Open);
    }

    #[test]
    fn test_landmarks_from_short_slice() {
        let points = [[0.0f32, 0.0]; 20];
        assert!(landmarks_from_points(&points).is_none());
    }

    #[test]
    fn test_landmarks_from_points() {
        let mut points = [[0.5f32, 0.5]; LANDMARK_COUNT];
        points[INDEX_TIP] = [0.1, 0.2];
        let landmarks = landmarks_from_points(&points).unwrap();
        assert_eq!(landmarks.index_tip(), Position::new(0.1, 0.2));
    }
}

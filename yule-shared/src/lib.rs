#![cfg_attr(not(feature = "std"), no_std)]

use serde::{Deserialize, Serialize};

/// Represents a 2D position in normalized image coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another position
    pub fn distance_to(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        libm::sqrtf(dx * dx + dy * dy)
    }

    /// Flip horizontally so a selfie-view camera maps to natural screen motion
    pub fn mirrored(&self) -> Self {
        Self {
            x: 1.0 - self.x,
            y: self.y,
        }
    }
}

/// Number of landmarks reported per hand by the tracking model
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_TIP: usize = 12;
pub const RING_TIP: usize = 16;
pub const PINKY_TIP: usize = 20;

/// Fingertip landmark indices, thumb first
pub const FINGERTIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];

/// Hand landmark data from tracking, one frame of one hand
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandLandmarks {
    pub points: [Position; LANDMARK_COUNT],
}

impl HandLandmarks {
    pub fn new(points: [Position; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    pub fn wrist(&self) -> Position {
        self.points[WRIST]
    }

    pub fn thumb_tip(&self) -> Position {
        self.points[THUMB_TIP]
    }

    pub fn index_tip(&self) -> Position {
        self.points[INDEX_TIP]
    }

    pub fn middle_tip(&self) -> Position {
        self.points[MIDDLE_TIP]
    }

    pub fn ring_tip(&self) -> Position {
        self.points[RING_TIP]
    }

    pub fn pinky_tip(&self) -> Position {
        self.points[PINKY_TIP]
    }

    /// Calculate pinch distance (distance between thumb and index finger tips)
    pub fn pinch_distance(&self) -> f32 {
        self.thumb_tip().distance_to(&self.index_tip())
    }

    /// Distance of a landmark from the wrist
    pub fn reach(&self, landmark: usize) -> f32 {
        self.points[landmark].distance_to(&self.wrist())
    }

    /// The five fingertips, thumb first
    pub fn fingertips(&self) -> [Position; 5] {
        FINGERTIPS.map(|i| self.points[i])
    }
}

/// Discrete hand pose classified from a single frame
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gesture {
    Open,
    Closed,
    Pinch,
    Ok,
    #[default]
    None,
}

/// Classifier output for one camera frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandSample {
    pub present: bool,
    pub gesture: Gesture,
    /// Mirrored index fingertip, normalized 0-1
    pub cursor: Position,
    pub pinch_distance: f32,
    /// Mirrored fingertips, thumb first
    pub fingertips: Option<[Position; 5]>,
}

impl HandSample {
    /// Neutral sample published when no hand is detected
    pub fn absent() -> Self {
        Self {
            present: false,
            gesture: Gesture::None,
            cursor: Position::new(0.5, 0.5),
            pinch_distance: 1.0,
            fingertips: None,
        }
    }
}

impl Default for HandSample {
    fn default() -> Self {
        Self::absent()
    }
}

/// Overall scene layout
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VisualMode {
    #[default]
    Tree,
    /// Sphere with a photo ring
    Saturn,
    Galaxy,
    Heart,
}

/// Linear RGB color, components 0-1
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a 0xRRGGBB value
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn lerp(&self, other: &Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }
}

/// Tree colors offered by the UI
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Palette {
    ClassicPine,
    SantaRed,
    Gold,
    Snow,
}

impl Palette {
    pub fn hex(&self) -> u32 {
        match self {
            Palette::ClassicPine => 0x0F4225,
            Palette::SantaRed => 0xD42426,
            Palette::Gold => 0xFFD700,
            Palette::Snow => 0xFFFFFF,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Palette::ClassicPine => "Classic Pine",
            Palette::SantaRed => "Santa Red",
            Palette::Gold => "Gold",
            Palette::Snow => "Snow",
        }
    }
}

/// Gesture classification thresholds, in normalized image units
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GestureThresholds {
    /// Thumb-index distance below which the hand is pinching
    pub pinch: f32,
    /// Fingertip-wrist distance above which a finger counts as extended
    pub extended: f32,
    /// Average fingertip reach below which the hand is a fist
    pub closed: f32,
    /// Average fingertip reach above which the hand is open
    pub open: f32,
}

impl Default for GestureThresholds {
    fn default() -> Self {
        Self {
            pinch: 0.08,
            extended: 0.2,
            closed: 0.18,
            open: 0.25,
        }
    }
}

/// Entity counts per class
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityCounts {
    pub particles: usize,
    pub ornaments: usize,
    pub gifts: usize,
}

impl Default for EntityCounts {
    fn default() -> Self {
        Self {
            particles: 20_000,
            ornaments: 200,
            gifts: 60,
        }
    }
}

/// Per-frame exponential blend factors
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendFactors {
    pub particles: f32,
    pub ornaments: f32,
    pub gifts: f32,
    pub photos: f32,
    pub scale: f32,
    pub rotation: f32,
}

impl Default for BlendFactors {
    fn default() -> Self {
        Self {
            particles: 0.04,
            ornaments: 0.05,
            gifts: 0.05,
            photos: 0.08,
            scale: 0.1,
            rotation: 0.05,
        }
    }
}

/// Scene configuration, everything tunable at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub counts: EntityCounts,
    pub blend: BlendFactors,
    /// Idle yaw velocity in TREE/SATURN/HEART, rad/s
    pub idle_rotation: f32,
    /// Yaw velocity in GALAXY, rad/s
    pub galaxy_rotation: f32,
    /// Photo ring orbit velocity in SATURN, rad/s
    pub ring_rotation: f32,
    pub galaxy_drift_amplitude: f32,
    pub galaxy_drift_frequency: f32,
    /// Ornament and gift spin, rad/frame
    pub spin_rate: f32,
    pub galaxy_spin_rate: f32,
    pub photo_spacing: f32,
    pub slideshow_speed: f32,
    pub slideshow_offset: f32,
    /// 0xRRGGBB tree color
    pub base_color: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            counts: EntityCounts::default(),
            blend: BlendFactors::default(),
            idle_rotation: 0.05,
            galaxy_rotation: 0.01,
            ring_rotation: 0.02,
            galaxy_drift_amplitude: 5.0,
            galaxy_drift_frequency: 0.1,
            spin_rate: 0.01,
            galaxy_spin_rate: 0.004,
            photo_spacing: 3.5,
            slideshow_speed: 2.0,
            slideshow_offset: 5.0,
            base_color: Palette::ClassicPine.hex(),
        }
    }
}

/// Status summary reported by the host once per interval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneStatus {
    pub mode: VisualMode,
    pub frame: u64,
    pub photo_count: usize,
    pub hand_present: bool,
    pub gesture: Gesture,
    pub music_playing: bool,
}

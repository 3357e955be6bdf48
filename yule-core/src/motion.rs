//! Interpolation engine: structure-of-arrays entity state blended toward the
//! active mode's targets, plus the group transforms layered on top.

use std::f32::consts::PI;

use serde::Serialize;

use yule_shared::{Color, HandSample, SceneSettings, VisualMode};

use crate::geometry::PointSet;
use crate::Vec3;

/// Exponential blend: `current + alpha * (target - current)`
pub fn blend(current: f32, target: f32, alpha: f32) -> f32 {
    current + alpha * (target - current)
}

/// One point set per visual mode for a single entity class
#[derive(Debug, Clone, Default)]
pub struct ModeTargets {
    pub tree: PointSet,
    pub saturn: PointSet,
    pub galaxy: PointSet,
    pub heart: PointSet,
}

impl ModeTargets {
    pub fn new(tree: PointSet, saturn: PointSet, galaxy: PointSet, heart: PointSet) -> Self {
        Self {
            tree,
            saturn,
            galaxy,
            heart,
        }
    }

    pub fn for_mode(&self, mode: VisualMode) -> &PointSet {
        match mode {
            VisualMode::Tree => &self.tree,
            VisualMode::Saturn => &self.saturn,
            VisualMode::Galaxy => &self.galaxy,
            VisualMode::Heart => &self.heart,
        }
    }
}

/// Live state of every entity in a class, indexed by entity id
#[derive(Debug, Clone, Default)]
pub struct EntityField {
    pub positions: Vec<Vec3>,
    pub scales: Vec<f32>,
    /// Own spin around the vertical axis
    pub yaws: Vec<f32>,
    /// Fixed per-entity phase for idle animation
    pub phases: Vec<f32>,
    pub colors: Vec<Color>,
    /// Secondary color (gift ribbons); empty when the class has none
    pub accents: Vec<Color>,
}

impl EntityField {
    /// Entities start at their positions in `initial`, phase = index
    pub fn new(initial: &PointSet, scale: f32) -> Self {
        let count = initial.len();
        Self {
            positions: initial.iter().collect(),
            scales: vec![scale; count],
            yaws: vec![0.0; count],
            phases: (0..count).map(|i| i as f32).collect(),
            colors: vec![Color::WHITE; count],
            accents: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Append one entity
    pub fn push(&mut self, position: Vec3, scale: f32, phase: f32, color: Color) {
        self.positions.push(position);
        self.scales.push(scale);
        self.yaws.push(0.0);
        self.phases.push(phase);
        self.colors.push(color);
    }

    pub fn truncate(&mut self, len: usize) {
        self.positions.truncate(len);
        self.scales.truncate(len);
        self.yaws.truncate(len);
        self.phases.truncate(len);
        self.colors.truncate(len);
        self.accents.truncate(len);
    }

    /// Pull every entity `alpha` of the way toward its target. Entities
    /// beyond the end of `targets` head for the origin
    pub fn seek(&mut self, targets: &PointSet, alpha: f32) {
        for (i, position) in self.positions.iter_mut().enumerate() {
            *position = position.lerp(&targets.get_or_origin(i), alpha);
        }
    }

    /// Blend every scale toward the same target
    pub fn seek_scale(&mut self, target: f32, alpha: f32) {
        for scale in self.scales.iter_mut() {
            *scale = blend(*scale, target, alpha);
        }
    }

    pub fn spin(&mut self, rate: f32) {
        for yaw in self.yaws.iter_mut() {
            *yaw = (*yaw + rate).rem_euclid(2.0 * PI);
        }
    }
}

/// Yaw and offset applied to a whole layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct GroupMotion {
    pub yaw: f32,
    pub offset: Vec3,
}

impl GroupMotion {
    /// Shared motion of particles, ornaments and gifts.
    ///
    /// TREE/SATURN/HEART: a present hand steers the yaw toward
    /// `(cursor.x - 0.5) * 2π`, otherwise it idles forward. GALAXY ignores the
    /// hand, idles slowly and sways sideways on a slow sine
    pub fn update_shared(
        &mut self,
        mode: VisualMode,
        sample: &HandSample,
        settings: &SceneSettings,
        dt: f32,
        elapsed: f32,
    ) {
        let chase = settings.blend.rotation;
        let drift_target = match mode {
            VisualMode::Galaxy => {
                self.yaw += settings.galaxy_rotation * dt;
                Vec3::new(galaxy_drift(settings, elapsed), 0.0, 0.0)
            }
            _ => {
                if sample.present {
                    let target = (sample.cursor.x - 0.5) * 2.0 * PI;
                    self.yaw = blend(self.yaw, target, chase);
                } else {
                    self.yaw += settings.idle_rotation * dt;
                }
                Vec3::ZERO
            }
        };
        self.offset = self.offset.lerp(&drift_target, chase);
    }

    /// Photo layer: slow orbit in TREE and SATURN, lateral sway in GALAXY
    /// and the slideshow conveyor in HEART
    pub fn update_photos(
        &mut self,
        mode: VisualMode,
        settings: &SceneSettings,
        photo_count: usize,
        dt: f32,
        elapsed: f32,
    ) {
        match mode {
            VisualMode::Tree => {
                self.yaw += settings.idle_rotation * dt;
                self.offset = Vec3::ZERO;
            }
            VisualMode::Saturn => {
                self.yaw += settings.ring_rotation * dt;
                self.offset = Vec3::ZERO;
            }
            VisualMode::Galaxy => {
                self.yaw = 0.0;
                self.offset = Vec3::new(galaxy_drift(settings, elapsed), 0.0, 0.0);
            }
            VisualMode::Heart => {
                self.yaw = 0.0;
                let total_width = photo_count as f32 * settings.photo_spacing;
                self.offset = Vec3::new(
                    conveyor_offset(
                        elapsed,
                        settings.slideshow_speed,
                        total_width,
                        settings.slideshow_offset,
                    ),
                    0.0,
                    0.0,
                );
            }
        }
    }
}

fn galaxy_drift(settings: &SceneSettings, elapsed: f32) -> f32 {
    (elapsed * settings.galaxy_drift_frequency).sin() * settings.galaxy_drift_amplitude
}

/// Wrap-around slideshow position: `-(elapsed * speed mod total_width) + start`
pub fn conveyor_offset(elapsed: f32, speed: f32, total_width: f32, start: f32) -> f32 {
    if total_width <= 0.0 {
        return start;
    }
    -(elapsed * speed).rem_euclid(total_width) + start
}

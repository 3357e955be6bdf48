//! Scene composition: owns every entity class, runs the per-frame tick and
//! exposes what the renderer needs to draw.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use yule_shared::{Color, HandSample, Palette, SceneSettings, VisualMode};

use crate::geometry::{
    generate, particle_sizes, GiftCone, Grid, HeartVolume, PointSet, Shape, Spiral,
};
use crate::media::PhotoQueue;
use crate::mode::ModeController;
use crate::motion::{blend, EntityField, GroupMotion, ModeTargets};
use crate::Vec3;

/// Where photos turn to face
pub const VIEWER: Vec3 = Vec3::new(0.0, 0.0, 50.0);
pub const STAR_POSITION: Vec3 = Vec3::new(0.0, 8.8, 0.0);
pub const GROUND_Y: f32 = -9.0;

const PHOTO_ROW_Y: f32 = -7.0;
const SATURN_RING_RADIUS: f32 = 16.0;
const SPOTLIGHT_SCALE: f32 = 3.5;
const SPOTLIGHT_DEPTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityClass {
    Particles,
    Ornaments,
    Gifts,
    Photos,
}

/// How a layer's instances are oriented
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum Orientation {
    /// Face the camera
    Billboard,
    /// Face a fixed point
    LookAt(Vec3),
    /// Own spin around the vertical axis, radians
    Yaw(f32),
}

/// One drawable instance as handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Instance {
    pub position: Vec3,
    pub scale: f32,
    pub orientation: Orientation,
    pub color: Color,
    pub accent: Option<Color>,
}

/// Whole-scene framing chosen from the viewport aspect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SceneRoot {
    pub scale: f32,
    pub y: f32,
}

impl SceneRoot {
    pub fn for_viewport(width: f32, height: f32) -> Self {
        if width < height {
            Self { scale: 0.55, y: -3.0 }
        } else {
            Self { scale: 0.8, y: -2.0 }
        }
    }
}

impl Default for SceneRoot {
    fn default() -> Self {
        Self { scale: 0.8, y: -2.0 }
    }
}

/// Star on top of the tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Star {
    pub position: Vec3,
    pub yaw: f32,
    pub scale: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AmbientFlags {
    pub star_field: bool,
    pub ground_plane_y: f32,
    pub sparkles: bool,
    pub spiral_line: bool,
}

/// Borrowed view of one entity class
#[derive(Debug, Clone, Copy)]
pub struct InstanceLayer<'a> {
    pub class: EntityClass,
    pub transform: GroupMotion,
    field: &'a EntityField,
}

impl<'a> InstanceLayer<'a> {
    fn new(class: EntityClass, transform: GroupMotion, field: &'a EntityField) -> Self {
        Self {
            class,
            transform,
            field,
        }
    }

    pub fn len(&self) -> usize {
        self.field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field.is_empty()
    }

    pub fn instance(&self, index: usize) -> Option<Instance> {
        let field = self.field;
        let orientation = match self.class {
            EntityClass::Particles => Orientation::Billboard,
            EntityClass::Photos => Orientation::LookAt(VIEWER),
            EntityClass::Ornaments | EntityClass::Gifts => Orientation::Yaw(*field.yaws.get(index)?),
        };

        Some(Instance {
            position: *field.positions.get(index)?,
            scale: *field.scales.get(index)?,
            orientation,
            color: *field.colors.get(index)?,
            accent: field.accents.get(index).copied(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Instance> + 'a {
        let layer = *self;
        (0..layer.len()).filter_map(move |i| layer.instance(i))
    }
}

/// Everything the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub mode: VisualMode,
    pub elapsed: f32,
    pub root: SceneRoot,
    pub particles: InstanceLayer<'a>,
    pub ornaments: InstanceLayer<'a>,
    pub gifts: InstanceLayer<'a>,
    pub photos: InstanceLayer<'a>,
    pub star: Star,
    /// Polyline joining the photos, drawn in TREE mode only
    pub spiral_line: Option<&'a PointSet>,
    pub ambient: AmbientFlags,
}

impl Frame<'_> {
    pub fn layers(&self) -> [InstanceLayer<'_>; 4] {
        [self.particles, self.ornaments, self.gifts, self.photos]
    }

    /// Owned copy for serialization
    pub fn snapshot(&self) -> FrameSnapshot {
        FrameSnapshot {
            mode: self.mode,
            elapsed: self.elapsed,
            root: self.root,
            star: self.star,
            ambient: self.ambient,
            spiral_line: self
                .spiral_line
                .map(|line| line.iter().collect())
                .unwrap_or_default(),
            layers: self
                .layers()
                .iter()
                .map(|layer| LayerSnapshot {
                    class: layer.class,
                    transform: layer.transform,
                    instances: layer.iter().collect(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LayerSnapshot {
    pub class: EntityClass,
    pub transform: GroupMotion,
    pub instances: Vec<Instance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameSnapshot {
    pub mode: VisualMode,
    pub elapsed: f32,
    pub root: SceneRoot,
    pub star: Star,
    pub ambient: AmbientFlags,
    pub spiral_line: Vec<Vec3>,
    pub layers: Vec<LayerSnapshot>,
}

/// Particle tint toward a per-mode accent, with the maximum blend weight
fn particle_accent(mode: VisualMode) -> Option<(Color, f32)> {
    match mode {
        VisualMode::Tree => None,
        VisualMode::Galaxy => Some((Color::from_hex(0x4400AA), 0.8)),
        VisualMode::Saturn => Some((Color::from_hex(0xFF8800), 0.3)),
        VisualMode::Heart => Some((Color::from_hex(0xFF0055), 0.8)),
    }
}

/// Classic pine is too dark as additive particles; brighten it
fn particle_base(hex: u32) -> Color {
    if hex == Palette::ClassicPine.hex() {
        Color::from_hex(0x1A6B3C)
    } else {
        Color::from_hex(hex)
    }
}

fn ornament_scale(mode: VisualMode) -> f32 {
    match mode {
        VisualMode::Galaxy => 0.0,
        _ => 0.45,
    }
}

fn gift_scale(mode: VisualMode) -> f32 {
    match mode {
        VisualMode::Tree => 0.6,
        VisualMode::Saturn | VisualMode::Heart => 0.5,
        VisualMode::Galaxy => 0.0,
    }
}

fn photo_scale(mode: VisualMode) -> f32 {
    match mode {
        VisualMode::Tree => 1.5,
        VisualMode::Saturn => 1.2,
        VisualMode::Galaxy | VisualMode::Heart => 1.8,
    }
}

/// Occasional galaxy reveal, true for a short window of each sine period
pub fn spotlighted(elapsed: f32, phase: f32) -> bool {
    ((elapsed + phase) * 0.5).sin() > 0.96
}

pub struct Scene {
    settings: SceneSettings,
    rng: StdRng,
    controller: ModeController,
    elapsed: f32,
    frames: u64,
    base_color: u32,
    root: SceneRoot,

    particles: EntityField,
    particle_targets: ModeTargets,
    particle_sizes: Vec<f32>,

    ornaments: EntityField,
    ornament_targets: ModeTargets,

    gifts: EntityField,
    gift_targets: ModeTargets,

    photos: EntityField,
    photo_targets: ModeTargets,

    group: GroupMotion,
    photo_group: GroupMotion,
    star: Star,
}

impl Scene {
    pub fn new(settings: SceneSettings) -> Self {
        Self::from_rng(settings, StdRng::from_entropy())
    }

    /// Reproducible scene, for tests and recordings
    pub fn with_seed(settings: SceneSettings, seed: u64) -> Self {
        Self::from_rng(settings, StdRng::seed_from_u64(seed))
    }

    fn from_rng(settings: SceneSettings, mut rng: StdRng) -> Self {
        let counts = settings.counts.clone();

        let particle_targets = ModeTargets::new(
            generate(&Shape::Spiral(Spiral::tree()), counts.particles, &mut rng),
            generate(&Shape::SphereVolume { radius: 7.0 }, counts.particles, &mut rng),
            generate(&Shape::RandomCloud { spread: 60.0 }, counts.particles, &mut rng),
            generate(&Shape::HeartVolume(HeartVolume::default()), counts.particles, &mut rng),
        );
        let particle_sizes = particle_sizes(counts.particles, &mut rng);
        let particles = EntityField::new(&particle_targets.tree, 1.0);

        let ornament_targets = ModeTargets::new(
            generate(&Shape::Spiral(Spiral::ornaments()), counts.ornaments, &mut rng),
            generate(
                &Shape::SphereSurface {
                    radius: 7.0,
                    jitter: 0.2,
                },
                counts.ornaments,
                &mut rng,
            ),
            generate(&Shape::RandomCloud { spread: 20.0 }, counts.ornaments, &mut rng),
            generate(&Shape::HeartVolume(HeartVolume::default()), counts.ornaments, &mut rng),
        );
        let mut ornaments = EntityField::new(&ornament_targets.tree, ornament_scale(VisualMode::Tree));
        let gold = Color::from_hex(0xFFD700);
        let red = Color::from_hex(0xFF0000);
        for (i, color) in ornaments.colors.iter_mut().enumerate() {
            *color = if i % 2 == 0 { gold } else { red };
        }

        let gift_targets = ModeTargets::new(
            generate(&Shape::GiftCone(GiftCone::default()), counts.gifts, &mut rng),
            generate(
                &Shape::SphereSurface {
                    radius: 7.5,
                    jitter: 0.2,
                },
                counts.gifts,
                &mut rng,
            ),
            generate(&Shape::RandomCloud { spread: 20.0 }, counts.gifts, &mut rng),
            generate(&Shape::HeartVolume(HeartVolume::default()), counts.gifts, &mut rng),
        );
        let mut gifts = EntityField::new(&gift_targets.tree, gift_scale(VisualMode::Tree));
        // Two kinds alternate: gold box with red ribbon, green box with gold ribbon
        gifts.colors = (0..counts.gifts)
            .map(|i| if i % 2 == 0 { Color::from_hex(0xFFCC00) } else { Color::from_hex(0x005500) })
            .collect();
        gifts.accents = (0..counts.gifts)
            .map(|i| if i % 2 == 0 { Color::from_hex(0xD42426) } else { gold })
            .collect();

        let base_color = settings.base_color;
        let mut scene = Self {
            settings,
            rng,
            controller: ModeController::new(),
            elapsed: 0.0,
            frames: 0,
            base_color,
            root: SceneRoot::default(),
            particles,
            particle_targets,
            particle_sizes,
            ornaments,
            ornament_targets,
            gifts,
            gift_targets,
            photos: EntityField::default(),
            photo_targets: ModeTargets::default(),
            group: GroupMotion::default(),
            photo_group: GroupMotion::default(),
            star: Star {
                position: STAR_POSITION,
                yaw: 0.0,
                scale: 1.0,
            },
        };
        scene.regenerate_photo_targets(0);
        scene
    }

    pub fn mode(&self) -> VisualMode {
        self.controller.current()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn photo_count(&self) -> usize {
        self.photos.len()
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn set_base_color(&mut self, hex: u32) {
        self.base_color = hex;
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.set_base_color(palette.hex());
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.root = SceneRoot::for_viewport(width, height);
    }

    pub fn field(&self, class: EntityClass) -> &EntityField {
        match class {
            EntityClass::Particles => &self.particles,
            EntityClass::Ornaments => &self.ornaments,
            EntityClass::Gifts => &self.gifts,
            EntityClass::Photos => &self.photos,
        }
    }

    pub fn targets(&self, class: EntityClass) -> &ModeTargets {
        match class {
            EntityClass::Particles => &self.particle_targets,
            EntityClass::Ornaments => &self.ornament_targets,
            EntityClass::Gifts => &self.gift_targets,
            EntityClass::Photos => &self.photo_targets,
        }
    }

    /// Where entity `index` of `class` is heading in the current mode
    pub fn target_of(&self, class: EntityClass, index: usize) -> Vec3 {
        self.targets(class).for_mode(self.mode()).get_or_origin(index)
    }

    /// Advance one frame: mode evaluation first, then every entity pass.
    /// Returns the new mode when the sample switched it
    pub fn tick(&mut self, sample: &HandSample, photos: &PhotoQueue, dt: f32) -> Option<VisualMode> {
        self.frames += 1;
        self.elapsed += dt;

        let changed = self.controller.apply(sample);
        let mode = self.mode();

        self.sync_photos(photos.len());

        self.group
            .update_shared(mode, sample, &self.settings, dt, self.elapsed);
        self.photo_group
            .update_photos(mode, &self.settings, self.photos.len(), dt, self.elapsed);

        self.update_particles(mode);
        self.update_ornaments(mode);
        self.update_gifts(mode);
        self.update_photos(mode);
        self.update_star(mode);

        changed
    }

    pub fn frame(&self) -> Frame<'_> {
        let mode = self.mode();
        let layer = InstanceLayer::new;

        Frame {
            mode,
            elapsed: self.elapsed,
            root: self.root,
            particles: layer(EntityClass::Particles, self.group, &self.particles),
            ornaments: layer(EntityClass::Ornaments, self.group, &self.ornaments),
            gifts: layer(EntityClass::Gifts, self.group, &self.gifts),
            photos: layer(EntityClass::Photos, self.photo_group, &self.photos),
            star: self.star,
            spiral_line: self.spiral_visible().then_some(&self.photo_targets.tree),
            ambient: AmbientFlags {
                star_field: true,
                ground_plane_y: GROUND_Y,
                sparkles: mode == VisualMode::Galaxy,
                spiral_line: self.spiral_visible(),
            },
        }
    }

    fn spiral_visible(&self) -> bool {
        self.mode() == VisualMode::Tree && !self.photos.is_empty()
    }

    fn spin_rate(&self, mode: VisualMode) -> f32 {
        match mode {
            VisualMode::Galaxy => self.settings.galaxy_spin_rate,
            _ => self.settings.spin_rate,
        }
    }

    fn update_particles(&mut self, mode: VisualMode) {
        self.particles.seek(
            self.particle_targets.for_mode(mode),
            self.settings.blend.particles,
        );

        let shrink = if mode == VisualMode::Galaxy { 0.6 } else { 1.0 };
        let t = self.elapsed;
        for ((scale, phase), size) in self
            .particles
            .scales
            .iter_mut()
            .zip(self.particles.phases.iter())
            .zip(self.particle_sizes.iter())
        {
            *scale = ((t * 2.0 + phase).sin() * 0.2 + 0.8) * shrink * size;
        }

        let base = particle_base(self.base_color);
        match particle_accent(mode) {
            Some((accent, weight)) => {
                for color in self.particles.colors.iter_mut() {
                    *color = base.lerp(&accent, self.rng.gen::<f32>() * weight);
                }
            }
            None => self.particles.colors.fill(base),
        }
    }

    fn update_ornaments(&mut self, mode: VisualMode) {
        self.ornaments.seek(
            self.ornament_targets.for_mode(mode),
            self.settings.blend.ornaments,
        );
        self.ornaments
            .seek_scale(ornament_scale(mode), self.settings.blend.scale);
        let spin = self.spin_rate(mode);
        self.ornaments.spin(spin);
    }

    fn update_gifts(&mut self, mode: VisualMode) {
        self.gifts
            .seek(self.gift_targets.for_mode(mode), self.settings.blend.gifts);
        self.gifts
            .seek_scale(gift_scale(mode), self.settings.blend.scale);
        let spin = self.spin_rate(mode);
        self.gifts.spin(spin);
    }

    fn update_photos(&mut self, mode: VisualMode) {
        let targets = self.photo_targets.for_mode(mode);
        let alpha = self.settings.blend.photos;
        let scale_alpha = self.settings.blend.scale;
        let base_scale = photo_scale(mode);

        for i in 0..self.photos.len() {
            let mut target = targets.get_or_origin(i);
            let mut scale = base_scale;
            if mode == VisualMode::Galaxy && spotlighted(self.elapsed, self.photos.phases[i]) {
                scale = SPOTLIGHT_SCALE;
                target.z += SPOTLIGHT_DEPTH;
            }

            self.photos.positions[i] = self.photos.positions[i].lerp(&target, alpha);
            self.photos.scales[i] = blend(self.photos.scales[i], scale, scale_alpha);
        }
    }

    fn update_star(&mut self, mode: VisualMode) {
        self.star.yaw = self.elapsed * 0.2;
        let target = if mode == VisualMode::Tree { 1.2 } else { 0.0 };
        self.star.scale = blend(self.star.scale, target, 0.1);
    }

    /// Match the photo entities to the queue length. Existing photos keep
    /// their live state; new ones appear at the origin
    fn sync_photos(&mut self, count: usize) {
        if count == self.photos.len() {
            return;
        }

        log::debug!("photo layout {} -> {} entities", self.photos.len(), count);
        if count < self.photos.len() {
            self.photos.truncate(count);
        }
        while self.photos.len() < count {
            let phase = self.rng.gen::<f32>() * 100.0;
            self.photos.push(Vec3::ZERO, 1.0, phase, Color::WHITE);
        }
        self.regenerate_photo_targets(count);
    }

    fn regenerate_photo_targets(&mut self, count: usize) {
        let laid_out = count.max(1);
        let rng = &mut self.rng;
        self.photo_targets = ModeTargets::new(
            generate(&Shape::Spiral(Spiral::photos()), count, rng),
            generate(&Shape::saturn_ring(SATURN_RING_RADIUS), laid_out, rng),
            generate(&Shape::Grid(Grid::default()), laid_out, rng),
            generate(
                &Shape::Row {
                    spacing: self.settings.photo_spacing,
                    y: PHOTO_ROW_Y,
                },
                laid_out,
                rng,
            ),
        );
    }
}

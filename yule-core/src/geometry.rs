//! Target point clouds for every visual mode.
//!
//! All generators are pure apart from the random source they are handed.
//! Index `i` of a [`PointSet`] always belongs to entity `i`, across every
//! mode, which is how entities find their target after a mode switch.

use rand::Rng;
use std::f32::consts::PI;

use crate::Vec3;

/// Golden-angle azimuth increment used by the Fibonacci lattice
pub const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068); // π(3 − √5)

/// Immutable, flat `x, y, z` buffer with one position per entity
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointSet {
    data: Vec<f32>,
}

impl PointSet {
    pub fn from_fn(count: usize, mut f: impl FnMut(usize) -> Vec3) -> Self {
        let mut data = Vec::with_capacity(count * 3);
        for i in 0..count {
            let p = f(i);
            data.extend_from_slice(&[p.x, p.y, p.z]);
        }
        Self { data }
    }

    /// Number of entities
    pub fn len(&self) -> usize {
        self.data.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Flat scalar view, `len() * 3` long
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        let ix = index.checked_mul(3)?;
        let p = self.data.get(ix..ix + 3)?;
        Some(Vec3::new(p[0], p[1], p[2]))
    }

    /// Position of `index`, or the origin when the set is shorter than the
    /// live entity count
    pub fn get_or_origin(&self, index: usize) -> Vec3 {
        self.get(index).unwrap_or(Vec3::ZERO)
    }

    pub fn iter(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.data
            .chunks_exact(3)
            .map(|p| Vec3::new(p[0], p[1], p[2]))
    }
}

/// Cone spiral: `t = i / count`, angle `t * angle_span`,
/// radius `(1 - t) * base_radius + radius_offset`, height `(t - 0.5) * height`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spiral {
    /// Total sweep in radians over the full height
    pub angle_span: f32,
    pub base_radius: f32,
    pub radius_offset: f32,
    pub height: f32,
    /// Extra random angle in `[0, angle_jitter)`
    pub angle_jitter: f32,
    /// Per-axis jitter width, centred on zero
    pub jitter: Vec3,
}

impl Spiral {
    /// Particle tree: dense 25-turn cone with fuzzy edges
    pub fn tree() -> Self {
        Self {
            angle_span: PI * 50.0,
            base_radius: 9.0,
            radius_offset: 0.0,
            height: 16.0,
            angle_jitter: 0.0,
            jitter: Vec3::new(2.0, 1.5, 2.0),
        }
    }

    /// Ornaments hug the tree slightly inside the particle cone
    pub fn ornaments() -> Self {
        Self {
            angle_span: PI * 25.0,
            base_radius: 8.0,
            radius_offset: 0.2,
            height: 15.0,
            angle_jitter: 0.5,
            jitter: Vec3::ZERO,
        }
    }

    /// Photos wind around the outside of the tree
    pub fn photos() -> Self {
        Self {
            angle_span: PI * 12.0,
            base_radius: 7.0,
            radius_offset: 4.0,
            height: 16.0,
            angle_jitter: 0.0,
            jitter: Vec3::ZERO,
        }
    }
}

/// Random placement on the lower part of the tree cone
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiftCone {
    /// Upper bound of the sampled cone fraction
    pub max_ratio: f32,
    pub base_radius: f32,
    pub height: f32,
}

impl Default for GiftCone {
    fn default() -> Self {
        Self {
            max_ratio: 0.6,
            base_radius: 9.0,
            height: 16.0,
        }
    }
}

/// Rejection-sampled heart volume
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeartVolume {
    pub scale: f32,
    pub lift: f32,
    /// Candidates tried per point; the last one is kept if none fits
    pub max_attempts: u32,
}

impl Default for HeartVolume {
    fn default() -> Self {
        Self {
            scale: 7.0,
            lift: 2.0,
            max_attempts: 50,
        }
    }
}

/// Row/column wall layout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid {
    pub column_spacing: f32,
    pub row_spacing: f32,
    pub jitter: f32,
}

impl Default for Grid {
    fn default() -> Self {
        Self {
            column_spacing: 2.8,
            row_spacing: 3.5,
            jitter: 0.2,
        }
    }
}

/// Every layout the scene knows how to generate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Spiral(Spiral),
    GiftCone(GiftCone),
    SphereVolume { radius: f32 },
    /// Fibonacci lattice on a shell
    SphereSurface { radius: f32, jitter: f32 },
    HeartVolume(HeartVolume),
    /// Flat 2D heart curve with some depth
    HeartWall { spread: f32, lift: f32, depth: f32 },
    RandomCloud { spread: f32 },
    Ring { radius: f32, radial_jitter: f32, vertical_jitter: f32 },
    Grid(Grid),
    Row { spacing: f32, y: f32 },
}

impl Shape {
    pub fn saturn_ring(radius: f32) -> Self {
        Shape::Ring {
            radius,
            radial_jitter: 3.0,
            vertical_jitter: 0.5,
        }
    }

    pub fn heart_wall() -> Self {
        Shape::HeartWall {
            spread: 0.35,
            lift: 3.0,
            depth: 2.0,
        }
    }
}

/// Generate `count` positions for `shape`
pub fn generate<R: Rng + ?Sized>(shape: &Shape, count: usize, rng: &mut R) -> PointSet {
    match *shape {
        Shape::Spiral(spiral) => spiral_points(&spiral, count, rng),
        Shape::GiftCone(cone) => gift_cone(&cone, count, rng),
        Shape::SphereVolume { radius } => sphere_volume(radius, count, rng),
        Shape::SphereSurface { radius, jitter } => sphere_surface(radius, jitter, count, rng),
        Shape::HeartVolume(heart) => heart_volume(&heart, count, rng),
        Shape::HeartWall {
            spread,
            lift,
            depth,
        } => heart_wall(spread, lift, depth, count, rng),
        Shape::RandomCloud { spread } => random_cloud(spread, count, rng),
        Shape::Ring {
            radius,
            radial_jitter,
            vertical_jitter,
        } => ring(radius, radial_jitter, vertical_jitter, count, rng),
        Shape::Grid(grid) => wall_grid(&grid, count, rng),
        Shape::Row { spacing, y } => horizontal_row(spacing, y, count),
    }
}

/// Uniform sample in `[-width/2, width/2)`
fn centred<R: Rng + ?Sized>(rng: &mut R, width: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * width
}

pub fn spiral_points<R: Rng + ?Sized>(spiral: &Spiral, count: usize, rng: &mut R) -> PointSet {
    PointSet::from_fn(count, |i| {
        let t = i as f32 / count as f32;
        let angle = t * spiral.angle_span + rng.gen::<f32>() * spiral.angle_jitter;
        let radius = (1.0 - t) * spiral.base_radius + spiral.radius_offset;
        let height = (t - 0.5) * spiral.height;

        Vec3::new(
            angle.cos() * radius + centred(rng, spiral.jitter.x),
            height + centred(rng, spiral.jitter.y),
            angle.sin() * radius + centred(rng, spiral.jitter.z),
        )
    })
}

pub fn gift_cone<R: Rng + ?Sized>(cone: &GiftCone, count: usize, rng: &mut R) -> PointSet {
    PointSet::from_fn(count, |_| {
        let ratio = rng.gen::<f32>() * cone.max_ratio;
        let angle = rng.gen::<f32>() * PI * 2.0;
        let radius = (1.0 - ratio) * cone.base_radius;
        Vec3::new(
            angle.cos() * radius,
            (ratio - 0.5) * cone.height,
            angle.sin() * radius,
        )
    })
}

/// Uniform over the ball volume: cube-root radius and `acos` latitude,
/// so neither the centre nor the poles are over-sampled
pub fn sphere_volume<R: Rng + ?Sized>(radius: f32, count: usize, rng: &mut R) -> PointSet {
    PointSet::from_fn(count, |_| {
        let r = radius * rng.gen::<f32>().cbrt();
        let theta = 2.0 * PI * rng.gen::<f32>();
        let phi = (2.0 * rng.gen::<f32>() - 1.0).clamp(-1.0, 1.0).acos();
        Vec3::new(
            r * phi.sin() * theta.cos(),
            r * phi.sin() * theta.sin(),
            r * phi.cos(),
        )
    })
}

/// Fibonacci lattice on a shell of `radius`
pub fn sphere_surface<R: Rng + ?Sized>(
    radius: f32,
    jitter: f32,
    count: usize,
    rng: &mut R,
) -> PointSet {
    PointSet::from_fn(count, |i| {
        let y = ((i as f32 + 0.5) / count as f32) * 2.0 - 1.0;
        let r = (1.0 - y * y).max(0.0).sqrt();
        let phi = i as f32 * GOLDEN_ANGLE;

        Vec3::new(
            phi.cos() * r * radius + centred(rng, jitter),
            y * radius + centred(rng, jitter),
            phi.sin() * r * radius + centred(rng, jitter),
        )
    })
}

/// Implicit heart surface `(x² + 9/4·y² + z² − 1)³ − x²z³ − 9/80·y²z³`;
/// non-positive inside
pub fn heart_field(x: f32, y: f32, z: f32) -> f32 {
    let a = x * x + 2.25 * y * y + z * z - 1.0;
    a * a * a - x * x * z * z * z - (9.0 / 80.0) * y * y * z * z * z
}

/// Bounded rejection sampling. After `max_attempts` misses the last
/// candidate is accepted so generation always terminates
pub fn heart_volume<R: Rng + ?Sized>(heart: &HeartVolume, count: usize, rng: &mut R) -> PointSet {
    let attempts = heart.max_attempts.max(1);
    PointSet::from_fn(count, |_| {
        let mut candidate = Vec3::ZERO;
        for _ in 0..attempts {
            candidate = Vec3::new(
                centred(rng, 3.0),
                centred(rng, 3.0),
                centred(rng, 3.0),
            );
            if heart_field(candidate.x, candidate.y, candidate.z) <= 0.0 {
                break;
            }
        }

        Vec3::new(
            candidate.x * heart.scale,
            candidate.y * heart.scale + heart.lift,
            candidate.z * heart.scale,
        )
    })
}

/// Classic parametric heart curve, filled by a random per-point scale
pub fn heart_wall<R: Rng + ?Sized>(
    spread: f32,
    lift: f32,
    depth: f32,
    count: usize,
    rng: &mut R,
) -> PointSet {
    PointSet::from_fn(count, |i| {
        let angle = (i as f32 / count as f32) * PI * 2.0 * 10.0 + rng.gen::<f32>() * 0.5;
        let fill = rng.gen::<f32>().sqrt() * 0.8 + 0.2;

        let x = 16.0 * angle.sin().powi(3);
        let y = 13.0 * angle.cos()
            - 5.0 * (2.0 * angle).cos()
            - 2.0 * (3.0 * angle).cos()
            - (4.0 * angle).cos();

        Vec3::new(
            x * fill * spread,
            y * fill * spread + lift,
            centred(rng, depth),
        )
    })
}

pub fn random_cloud<R: Rng + ?Sized>(spread: f32, count: usize, rng: &mut R) -> PointSet {
    PointSet::from_fn(count, |_| {
        Vec3::new(
            centred(rng, spread),
            centred(rng, spread),
            centred(rng, spread),
        )
    })
}

/// Flat ring, evenly spaced by angle
pub fn ring<R: Rng + ?Sized>(
    radius: f32,
    radial_jitter: f32,
    vertical_jitter: f32,
    count: usize,
    rng: &mut R,
) -> PointSet {
    PointSet::from_fn(count, |i| {
        let angle = (i as f32 / count as f32) * PI * 2.0;
        let r = radius + centred(rng, radial_jitter);
        Vec3::new(
            angle.cos() * r,
            centred(rng, vertical_jitter),
            angle.sin() * r,
        )
    })
}

/// Columns needed for a roughly 3:2 wall
pub fn grid_columns(count: usize) -> usize {
    ((count as f32 * 1.5).sqrt().ceil() as usize).max(1)
}

pub fn wall_grid<R: Rng + ?Sized>(grid: &Grid, count: usize, rng: &mut R) -> PointSet {
    let cols = grid_columns(count);
    let rows = count as f32 / cols as f32;

    PointSet::from_fn(count, |i| {
        let col = (i % cols) as f32;
        let row = (i / cols) as f32;
        let x = (col - cols as f32 / 2.0) * grid.column_spacing;
        let y = (row - rows / 2.0) * grid.row_spacing;

        Vec3::new(
            x + centred(rng, grid.jitter),
            y + centred(rng, grid.jitter),
            0.0,
        )
    })
}

/// Slideshow strip along +x
pub fn horizontal_row(spacing: f32, y: f32, count: usize) -> PointSet {
    PointSet::from_fn(count, |i| Vec3::new(i as f32 * spacing, y, 0.0))
}

/// Base particle sizes in `[0.5, 1.5)`
pub fn particle_sizes<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<f32> {
    (0..count).map(|_| 0.5 + rng.gen::<f32>()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn all_shapes() -> Vec<Shape> {
        vec![
            Shape::Spiral(Spiral::tree()),
            Shape::Spiral(Spiral::ornaments()),
            Shape::Spiral(Spiral::photos()),
            Shape::GiftCone(GiftCone::default()),
            Shape::SphereVolume { radius: 7.0 },
            Shape::SphereSurface {
                radius: 7.0,
                jitter: 0.2,
            },
            Shape::HeartVolume(HeartVolume::default()),
            Shape::heart_wall(),
            Shape::RandomCloud { spread: 25.0 },
            Shape::saturn_ring(14.0),
            Shape::Grid(Grid::default()),
            Shape::Row {
                spacing: 3.5,
                y: -7.0,
            },
        ]
    }

    #[test]
    fn test_every_shape_has_exact_length() {
        let mut rng = rng();
        for shape in all_shapes() {
            for count in [0usize, 1, 17, 500] {
                let points = generate(&shape, count, &mut rng);
                assert_eq!(points.as_slice().len(), count * 3, "{shape:?} x {count}");
                assert_eq!(points.len(), count);
            }
        }
    }

    #[test]
    fn test_tree_without_jitter_stays_in_cone() {
        let spiral = Spiral {
            jitter: Vec3::ZERO,
            ..Spiral::tree()
        };
        let points = spiral_points(&spiral, 2000, &mut rng());
        for p in points.iter() {
            assert!(p.horizontal_radius() <= spiral.base_radius + 1e-3);
            assert!(p.y >= -spiral.height / 2.0 - 1e-3 && p.y <= spiral.height / 2.0 + 1e-3);
        }
    }

    #[test]
    fn test_tree_jitter_is_bounded() {
        let spiral = Spiral::tree();
        let slack = (spiral.jitter.x * spiral.jitter.x + spiral.jitter.z * spiral.jitter.z).sqrt()
            / 2.0;
        let points = spiral_points(&spiral, 5000, &mut rng());
        for p in points.iter() {
            assert!(p.horizontal_radius() <= spiral.base_radius + slack + 1e-3);
            assert!(p.y.abs() <= spiral.height / 2.0 + spiral.jitter.y / 2.0 + 1e-3);
        }
    }

    #[test]
    fn test_tree_tapers_to_a_point() {
        let spiral = Spiral {
            jitter: Vec3::ZERO,
            ..Spiral::tree()
        };
        let points = spiral_points(&spiral, 1000, &mut rng());
        let base = points.get(0).unwrap();
        let top = points.get(999).unwrap();
        assert!(base.horizontal_radius() > 8.9);
        assert!(top.horizontal_radius() < 0.1);
        assert!(top.y > base.y);
    }

    #[test]
    fn test_sphere_volume_inside_ball() {
        let points = sphere_volume(7.0, 5000, &mut rng());
        for p in points.iter() {
            assert!(p.magnitude() <= 7.0 + 1e-3);
        }
    }

    #[test]
    fn test_sphere_volume_not_clustered_at_poles() {
        // With acos latitude sampling |z|/r is uniform on [0, 1]
        let points = sphere_volume(1.0, 20_000, &mut rng());
        let polar = points
            .iter()
            .filter(|p| p.magnitude() > 0.0 && (p.z / p.magnitude()).abs() > 0.9)
            .count();
        let share = polar as f32 / 20_000.0;
        assert!((share - 0.1).abs() < 0.02, "polar share {share}");
    }

    #[test]
    fn test_fibonacci_points_on_shell() {
        let points = sphere_surface(7.0, 0.2, 300, &mut rng());
        // Per-axis jitter of ±0.1 moves a point at most √3·0.1 off the shell
        let epsilon = 0.1 * 3f32.sqrt() + 1e-3;
        for p in points.iter() {
            assert!((p.magnitude() - 7.0).abs() <= epsilon);
        }
    }

    #[test]
    fn test_fibonacci_golden_angle_steps() {
        let points = sphere_surface(1.0, 0.0, 200, &mut rng());
        let azimuths: Vec<f32> = points.iter().map(|p| p.z.atan2(p.x)).collect();
        let expected = GOLDEN_ANGLE.rem_euclid(2.0 * PI);
        for pair in azimuths.windows(2) {
            let step = (pair[1] - pair[0]).rem_euclid(2.0 * PI);
            assert!((step - expected).abs() < 1e-3, "step {step}");
        }
    }

    #[test]
    fn test_fibonacci_y_is_evenly_spaced() {
        let points = sphere_surface(1.0, 0.0, 4, &mut rng());
        let ys: Vec<f32> = points.iter().map(|p| p.y).collect();
        let expected = [-0.75, -0.25, 0.25, 0.75];
        for (y, e) in ys.iter().zip(expected) {
            assert!((y - e).abs() < 1e-6);
        }
    }

    #[test]
    fn test_heart_field_sign() {
        assert!(heart_field(0.0, 0.0, 0.0) < 0.0);
        assert!(heart_field(1.4, 1.4, 1.4) > 0.0);
    }

    #[test]
    fn test_heart_volume_mostly_inside() {
        let heart = HeartVolume::default();
        let points = heart_volume(&heart, 2000, &mut rng());
        let inside = points
            .iter()
            .filter(|p| {
                heart_field(
                    p.x / heart.scale,
                    (p.y - heart.lift) / heart.scale,
                    p.z / heart.scale,
                ) <= 1e-4
            })
            .count();
        assert!(inside >= 1950, "only {inside} inside");
    }

    #[test]
    fn test_heart_volume_single_attempt_terminates() {
        let heart = HeartVolume {
            max_attempts: 1,
            ..HeartVolume::default()
        };
        let points = heart_volume(&heart, 100, &mut rng());
        assert_eq!(points.len(), 100);
        for p in points.iter() {
            // Candidates come from the bounding cube either way
            assert!(p.x.abs() <= 1.5 * heart.scale);
            assert!((p.y - heart.lift).abs() <= 1.5 * heart.scale);
        }
    }

    #[test]
    fn test_random_cloud_in_cube() {
        let points = random_cloud(20.0, 1000, &mut rng());
        for p in points.iter() {
            assert!(p.x.abs() <= 10.0 && p.y.abs() <= 10.0 && p.z.abs() <= 10.0);
        }
    }

    #[test]
    fn test_ring_is_flat() {
        let points = ring(16.0, 3.0, 0.5, 100, &mut rng());
        for p in points.iter() {
            assert!(p.y.abs() <= 0.25);
            let r = p.horizontal_radius();
            assert!((14.5..=17.5).contains(&r));
        }
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(grid_columns(0), 1);
        assert_eq!(grid_columns(1), 2);
        assert_eq!(grid_columns(24), 6);
        assert_eq!(grid_columns(50), 9);
    }

    #[test]
    fn test_grid_is_centred() {
        let grid = Grid {
            jitter: 0.0,
            ..Grid::default()
        };
        let points = wall_grid(&grid, 24, &mut rng());
        let mean_x = points.iter().map(|p| p.x).sum::<f32>() / 24.0;
        assert!(mean_x.abs() <= grid.column_spacing);
        assert!(points.iter().all(|p| p.z == 0.0));
    }

    #[test]
    fn test_row_spacing() {
        let points = horizontal_row(3.5, -7.0, 5);
        for (i, p) in points.iter().enumerate() {
            assert_eq!(p.x, i as f32 * 3.5);
            assert_eq!(p.y, -7.0);
        }
    }

    #[test]
    fn test_short_point_set_falls_back_to_origin() {
        let points = horizontal_row(3.5, -7.0, 2);
        assert_eq!(points.get(5), None);
        assert_eq!(points.get_or_origin(5), Vec3::ZERO);
        assert_eq!(points.get_or_origin(1), Vec3::new(3.5, -7.0, 0.0));
    }

    #[test]
    fn test_particle_sizes_range() {
        let sizes = particle_sizes(1000, &mut rng());
        assert!(sizes.iter().all(|s| (0.5..1.5).contains(s)));
    }
}

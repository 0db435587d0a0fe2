use glam::{Mat4, Vec3};
use log::trace;
use serde::{Deserialize, Serialize};

/// Gap kept between the front and side thresholds when the side threshold
/// reaches or overtakes the front one.
pub const SIDE_EPSILON: f32 = 0.001;

pub const DEFAULT_FRONT: f32 = 0.8;
pub const DEFAULT_SIDE: f32 = 0.7;
pub const DEFAULT_NOISE: f32 = 0.0;
pub const DEFAULT_SIDE_COLOR: Vec3 = Vec3::ZERO;
pub const DEFAULT_FRONT_COLOR: Vec3 = Vec3::new(0.0, 1.0, 0.0);
pub const DEFAULT_IN_POINT: Vec3 = Vec3::Z;

/// User configured parameters of a fresnel node.
///
/// Matrices are stored in glam's column-vector convention. Use
/// [`matrix_from_host_rows`] to convert the row-major, row-vector layout the
/// host supplies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FresnelParams {
    #[serde(default = "default_side_color")]
    pub side_color: Vec3,
    #[serde(default = "default_front_color")]
    pub front_color: Vec3,
    #[serde(default = "default_in_point")]
    pub in_point: Vec3,
    #[serde(default = "identity")]
    pub in_matrix: Mat4,
    #[serde(default = "identity")]
    pub eye_to_world: Mat4,
    #[serde(default = "default_front")]
    pub front: f32,
    #[serde(default = "default_side")]
    pub side: f32,
    #[serde(default)]
    pub noise: f32,
}

impl Default for FresnelParams {
    fn default() -> Self {
        Self {
            side_color: DEFAULT_SIDE_COLOR,
            front_color: DEFAULT_FRONT_COLOR,
            in_point: DEFAULT_IN_POINT,
            in_matrix: Mat4::IDENTITY,
            eye_to_world: Mat4::IDENTITY,
            front: DEFAULT_FRONT,
            side: DEFAULT_SIDE,
            noise: DEFAULT_NOISE,
        }
    }
}

fn default_side_color() -> Vec3 {
    DEFAULT_SIDE_COLOR
}

fn default_front_color() -> Vec3 {
    DEFAULT_FRONT_COLOR
}

fn default_in_point() -> Vec3 {
    DEFAULT_IN_POINT
}

fn identity() -> Mat4 {
    Mat4::IDENTITY
}

fn default_front() -> f32 {
    DEFAULT_FRONT
}

fn default_side() -> f32 {
    DEFAULT_SIDE
}

/// Per-sample geometry supplied by the renderer, both in eye space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceSample {
    #[serde(default)]
    pub normal: Vec3,
    #[serde(default)]
    pub point: Vec3,
}

impl SurfaceSample {
    pub const fn new(normal: Vec3, point: Vec3) -> Self {
        Self { normal, point }
    }
}

/// Front/side thresholds with the ordering invariant already enforced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    front: f32,
    side: f32,
}

impl Thresholds {
    /// Builds the blend band. A side threshold at or above `front` is pulled
    /// down to `front - SIDE_EPSILON` so the band always has positive width.
    pub fn new(front: f32, side: f32) -> Self {
        let side = if side >= front {
            trace!("side threshold {side} not below front {front}; clamping");
            below(front)
        } else {
            side
        };
        Self { front, side }
    }

    pub fn front(&self) -> f32 {
        self.front
    }

    pub fn side(&self) -> f32 {
        self.side
    }

    pub fn band_width(&self) -> f32 {
        self.front - self.side
    }

    /// Maps a remapped facing ratio to the interpolation weight of the side
    /// color. Above `front` is pure front color, below `side` is pure side
    /// color; both bounds themselves fall into the band.
    pub fn blend_scalar(&self, facing: f32, noise: f32) -> f32 {
        if facing > self.front {
            0.0
        } else if facing < self.side {
            1.0
        } else {
            let scalar_normal = self.front - facing;
            ((scalar_normal * noise + scalar_normal) / (self.front - self.side)).clamp(0.0, 1.0)
        }
    }
}

/// `front - SIDE_EPSILON`, or at least one ulp below `front` when the
/// epsilon is absorbed by a large magnitude.
fn below(front: f32) -> f32 {
    let side = front - SIDE_EPSILON;
    if side < front {
        side
    } else {
        front - front.abs() * f32::EPSILON
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self::new(DEFAULT_FRONT, DEFAULT_SIDE)
    }
}

/// Every intermediate value of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Falloff {
    /// `in_point` carried through `in_matrix`.
    pub pointing: Vec3,
    /// Surface normal carried through the eye-to-world matrix.
    pub eye_to_world: Vec3,
    /// Normalized view vector. It takes no part in the blend.
    pub view: Vec3,
    /// Dot product remapped from `[-1, 1]` to `[0, 1]`, unclamped.
    pub facing: f32,
    pub scalar: f32,
    pub color: Vec3,
}

/// Stateless evaluator for the camera independent fresnel blend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FresnelEvaluator {
    params: FresnelParams,
    thresholds: Thresholds,
}

impl FresnelEvaluator {
    pub fn new(params: FresnelParams) -> Self {
        Self {
            thresholds: Thresholds::new(params.front, params.side),
            params,
        }
    }

    pub fn params(&self) -> &FresnelParams {
        &self.params
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Returns the blended color for one shading sample.
    pub fn evaluate(&self, sample: &SurfaceSample) -> Vec3 {
        self.evaluate_detailed(sample).color
    }

    pub fn evaluate_detailed(&self, sample: &SurfaceSample) -> Falloff {
        let params = &self.params;
        let pointing = params.in_matrix.transform_vector3(params.in_point);
        let view = sample.point.normalize_or_zero();
        let eye_to_world = params.eye_to_world.transform_vector3(sample.normal);

        let facing = (pointing.dot(eye_to_world) + 1.0) / 2.0;
        let scalar = self.thresholds.blend_scalar(facing, params.noise);
        let color = params.front_color + (params.side_color - params.front_color) * scalar;

        Falloff {
            pointing,
            eye_to_world,
            view,
            facing,
            scalar,
            color,
        }
    }

    /// Evaluates every sample independently, preserving input order.
    pub fn evaluate_batch(&self, samples: &[SurfaceSample]) -> Vec<Vec3> {
        samples.iter().map(|sample| self.evaluate(sample)).collect()
    }
}

/// Convenience wrapper for one-off evaluations.
pub fn evaluate(params: &FresnelParams, sample: &SurfaceSample) -> Vec3 {
    FresnelEvaluator::new(*params).evaluate(sample)
}

/// Converts 16 floats laid out row by row for row vectors (`v * M`, translation
/// in the last row) into the equivalent glam matrix.
pub fn matrix_from_host_rows(values: &[f32; 16]) -> Mat4 {
    // Reading host rows as glam columns is exactly the transpose we need.
    Mat4::from_cols_array(values)
}

/// Inverse of [`matrix_from_host_rows`].
pub fn host_rows(matrix: &Mat4) -> [f32; 16] {
    matrix.to_cols_array()
}

use std::f64::consts::TAU;
use std::time::Duration;

use cgmath::{perspective, Deg, InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3};

use crate::config::DemoConfig;

pub fn rotation_axis() -> Vector3<f32> {
    Vector3::new(1.0, 1.0, 0.0).normalize()
}

/// Angle after `elapsed` for one full turn every `period` seconds, wrapped
/// into `[0, 2π)`.
pub fn rotation_angle(elapsed: Duration, period: f64) -> Rad<f32> {
    let turns = (elapsed.as_secs_f64() / period).fract();

    Rad((turns * TAU) as f32)
}

pub fn world_matrix(angle: Rad<f32>) -> Matrix4<f32> {
    Matrix4::identity() * Matrix4::from_axis_angle(rotation_axis(), angle)
}

pub fn view_matrix(eye: [f32; 3], center: [f32; 3], up: [f32; 3]) -> Matrix4<f32> {
    Matrix4::look_at_rh(Point3::from(eye), Point3::from(center), Vector3::from(up))
}

pub fn projection_matrix(fov_y: Deg<f32>, aspect: f32, near: f32, far: f32) -> Matrix4<f32> {
    perspective(fov_y, aspect, near, far)
}

/// Flattens a matrix in the column-major order GL expects.
pub fn column_major(m: &Matrix4<f32>) -> [f32; 16] {
    let mut out = [0.0; 16];

    for col in 0..4 {
        for row in 0..4 {
            out[col * 4 + row] = m[col][row];
        }
    }

    out
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transforms {
    pub world: Matrix4<f32>,
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
    period: f64,
    fov_y: Deg<f32>,
    near: f32,
    far: f32,
}

impl Transforms {
    pub fn new(config: &DemoConfig, aspect: f32) -> Self {
        Self {
            world: Matrix4::identity(),
            view: view_matrix(config.eye, config.center, config.up),
            projection: projection_matrix(Deg(config.fov_y), aspect, config.near, config.far),
            period: config.rotation_period,
            fov_y: Deg(config.fov_y),
            near: config.near,
            far: config.far,
        }
    }

    /// Rebuilds the projection for a new viewport aspect ratio.
    pub fn set_aspect(&mut self, aspect: f32) -> &Matrix4<f32> {
        self.projection = projection_matrix(self.fov_y, aspect, self.near, self.far);
        &self.projection
    }

    /// Recomputes the world matrix for the given time since start.
    pub fn advance(&mut self, elapsed: Duration) -> &Matrix4<f32> {
        self.world = world_matrix(rotation_angle(elapsed, self.period));
        &self.world
    }
}

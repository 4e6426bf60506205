use std::path::Path;

use cgmath::{InnerSpace, Vector3};
use serde::Deserialize;
use thiserror::Error;

const UP_EPSILON: f32 = 1e-6;

/// Tunables shared by both tutorials. Every field may be omitted from the
/// config file.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    pub clear_color: [f32; 3],
    /// Seconds per full turn of the rotating triangle.
    pub rotation_period: f64,
    /// Vertical field of view in degrees.
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    pub eye: [f32; 3],
    pub center: [f32; 3],
    pub up: [f32; 3],
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            clear_color: [0.80, 0.85, 0.8],
            rotation_period: 6.0,
            fov_y: 45.0,
            near: 0.1,
            far: 1000.0,
            eye: [0.0, 0.0, -5.0],
            center: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
        }
    }
}

impl DemoConfig {
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path).map_err(ConfigError::Input)?;

        Self::parse(&config_str)
    }

    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = json5::from_str(s).map_err(ConfigError::Format)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.rotation_period > 0.0) {
            return Err(ConfigError::Invalid("rotation_period must be positive".into()));
        }

        if !(self.fov_y > 0.0 && self.fov_y < 180.0) {
            return Err(ConfigError::Invalid("fov_y must lie between 0 and 180 degrees".into()));
        }

        if !(self.near > 0.0 && self.near < self.far) {
            return Err(ConfigError::Invalid("near and far must satisfy 0 < near < far".into()));
        }

        if self.eye == self.center {
            return Err(ConfigError::Invalid("eye and center must differ".into()));
        }

        // look_at is undefined for a zero up or one parallel to the view direction
        let forward = Vector3::from(self.center) - Vector3::from(self.eye);
        let side = Vector3::from(self.up).cross(forward);
        if !(side.magnitude2() > UP_EPSILON * forward.magnitude2()) {
            return Err(ConfigError::Invalid("up must not be parallel to eye -> center".into()));
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config: {0}")]
    Input(std::io::Error),
    #[error("malformed config: {0}")]
    Format(json5::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

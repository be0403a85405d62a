//! Motion behavior parameters, loadable from YAML.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Control-loop rate in Hz.
    #[serde(default = "default_cycle_frequency")]
    pub cycle_frequency: f64,

    /// Fixed frame the robot pose is expressed in.
    #[serde(default = "default_local_frame")]
    pub local_frame: String,

    #[serde(default = "default_robot_base_frame")]
    pub robot_base_frame: String,

    /// Maximum accepted age of a pose, in seconds.
    #[serde(default = "default_transform_tolerance")]
    pub transform_tolerance: f64,

    /// Upper bound on commanded linear speed (m/s).
    #[serde(default = "default_max_speed")]
    pub max_speed: f64,
}

fn default_cycle_frequency() -> f64 {
    10.0
}
fn default_local_frame() -> String {
    "odom".to_string()
}
fn default_robot_base_frame() -> String {
    "base_link".to_string()
}
fn default_transform_tolerance() -> f64 {
    0.1
}
fn default_max_speed() -> f64 {
    0.5
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            cycle_frequency: default_cycle_frequency(),
            local_frame: default_local_frame(),
            robot_base_frame: default_robot_base_frame(),
            transform_tolerance: default_transform_tolerance(),
            max_speed: default_max_speed(),
        }
    }
}

/// Negative and NaN become zero, values past `Duration::MAX` saturate.
fn saturating_secs(secs: f64) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(if secs > 0.0 {
        Duration::MAX
    } else {
        Duration::ZERO
    })
}

impl BehaviorConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("Failed to parse behavior config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read behavior config from {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid behavior config in {}", path.display()))
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.cycle_frequency.is_finite() && self.cycle_frequency > 0.0) {
            bail!("cycle_frequency must be positive, got {}", self.cycle_frequency);
        }
        if !(self.max_speed.is_finite() && self.max_speed > 0.0) {
            bail!("max_speed must be positive, got {}", self.max_speed);
        }
        if !(self.transform_tolerance.is_finite() && self.transform_tolerance >= 0.0) {
            bail!(
                "transform_tolerance must be non-negative, got {}",
                self.transform_tolerance
            );
        }
        Ok(())
    }

    pub fn cycle_period(&self) -> Duration {
        saturating_secs(1.0 / self.cycle_frequency)
    }

    pub fn transform_tolerance(&self) -> Duration {
        saturating_secs(self.transform_tolerance)
    }
}

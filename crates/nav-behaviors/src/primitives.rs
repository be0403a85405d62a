use std::time::Duration;

use nav_core::{ErrorCode, Vector3};
use thiserror::Error;

/// Goal of a timed motion: drive `target.x` meters along the current heading
/// at `speed` m/s, within `time_allowance`.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionGoal {
    pub target: Vector3,
    pub speed: f64,
    pub time_allowance: Duration,
    pub disable_collision_checks: bool,
}

impl MotionGoal {
    pub fn along_heading(distance: f64, speed: f64, time_allowance: Duration) -> Self {
        Self {
            target: Vector3::new(distance, 0.0, 0.0),
            speed,
            time_allowance,
            disable_collision_checks: false,
        }
    }

    pub fn without_collision_checks(mut self) -> Self {
        self.disable_collision_checks = true;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MotionFeedback {
    pub distance_traveled: f64,
}

/// Validated, sign-consistent command: `displacement` and `speed` always
/// share a sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionCommand {
    pub displacement: f64,
    pub speed: f64,
}

/// Why a goal was refused before any motion happened.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Rejection {
    pub code: ErrorCode,
    pub message: String,
}

impl Rejection {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::InvalidInput,
            message: message.into(),
        }
    }
}

/// A bounded straight-line motion with its own goal conventions.
pub trait MotionPrimitive: 'static {
    /// Name used in logs and operator-facing messages.
    const NAME: &'static str;

    fn validate(&self, goal: &MotionGoal) -> Result<MotionCommand, Rejection>;
}

fn check_finite(name: &str, goal: &MotionGoal) -> Result<(), Rejection> {
    if goal.target.x.is_finite() && goal.speed.is_finite() {
        Ok(())
    } else {
        Err(Rejection::invalid_input(format!(
            "{name} requires a finite distance and speed."
        )))
    }
}

/// Drive along the current heading, forward or backward.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriveOnHeading;

impl MotionPrimitive for DriveOnHeading {
    const NAME: &'static str = "DriveOnHeading";

    fn validate(&self, goal: &MotionGoal) -> Result<MotionCommand, Rejection> {
        if goal.target.y != 0.0 || goal.target.z != 0.0 {
            return Err(Rejection::invalid_input(
                "DrivingOnHeading in Y and Z not supported, will only move in X.",
            ));
        }
        check_finite(Self::NAME, goal)?;
        if (goal.speed > 0.0 && goal.target.x < 0.0) || (goal.speed < 0.0 && goal.target.x > 0.0) {
            return Err(Rejection::invalid_input("Speed and command sign did not match"));
        }
        Ok(MotionCommand {
            displacement: goal.target.x,
            speed: goal.speed,
        })
    }
}

/// Reverse along the current heading. Caller signs are ignored: the robot
/// always moves backward.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackUp;

impl MotionPrimitive for BackUp {
    const NAME: &'static str = "BackUp";

    fn validate(&self, goal: &MotionGoal) -> Result<MotionCommand, Rejection> {
        if goal.target.y != 0.0 || goal.target.z != 0.0 {
            return Err(Rejection::invalid_input(
                "Backing up in Y and Z not supported, will only move in X.",
            ));
        }
        check_finite(Self::NAME, goal)?;
        Ok(MotionCommand {
            displacement: -goal.target.x.abs(),
            speed: -goal.speed.abs(),
        })
    }
}

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Planar robot pose in a fixed frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub const fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    /// Euclidean distance between the two positions (heading ignored).
    pub fn distance(&self, other: &Pose2D) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Pose reached by moving `distance` along the current heading.
    pub fn advanced(&self, distance: f64) -> Pose2D {
        Pose2D {
            x: self.x + distance * self.theta.cos(),
            y: self.y + distance * self.theta.sin(),
            theta: self.theta,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Velocity command in the robot base frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Twist {
    pub linear_x: f64,
    pub linear_y: f64,
    pub angular_z: f64,
}

impl Twist {
    pub const fn zero() -> Self {
        Self {
            linear_x: 0.0,
            linear_y: 0.0,
            angular_z: 0.0,
        }
    }

    pub const fn linear(linear_x: f64) -> Self {
        Self {
            linear_x,
            linear_y: 0.0,
            angular_z: 0.0,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.linear_x == 0.0 && self.linear_y == 0.0 && self.angular_z == 0.0
    }
}

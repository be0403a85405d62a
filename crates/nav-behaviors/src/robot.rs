use std::time::Duration;

use nav_core::{Pose2D, Twist};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transform from `{robot_frame}` to `{global_frame}` is unavailable")]
pub struct PoseUnavailable {
    pub global_frame: String,
    pub robot_frame: String,
}

/// Robot pose lookup. Answers may change between calls; callers must not
/// cache them across control cycles.
pub trait PoseProvider {
    fn current_pose(
        &self,
        global_frame: &str,
        robot_frame: &str,
        tolerance: Duration,
    ) -> Result<Pose2D, PoseUnavailable>;
}

/// Collision interlock: would executing `command` from `pose` be safe?
pub trait SafetyInterlock {
    fn is_command_safe(&self, pose: &Pose2D, command: &Twist) -> bool;
}

/// Velocity command output.
pub trait CommandSink {
    fn publish(&mut self, command: Twist);
}

/// Monotonic time since an arbitrary epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Everything a timed motion behavior needs from the robot.
pub trait MotionWorld: PoseProvider + SafetyInterlock + CommandSink + Clock {}

impl<T> MotionWorld for T where T: PoseProvider + SafetyInterlock + CommandSink + Clock {}

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use nav_behaviors::{
    BehaviorConfig, Clock, CommandSink, MotionGoal, PoseProvider, PoseUnavailable,
    SafetyInterlock,
};
use nav_core::{Pose2D, Twist};

/// Control period used by every test: 8 Hz keeps all step sizes exact in
/// binary floating point.
pub const PERIOD: Duration = Duration::from_millis(125);

pub fn config() -> BehaviorConfig {
    BehaviorConfig {
        cycle_frequency: 8.0,
        ..BehaviorConfig::default()
    }
}

pub fn goal(distance: f64, speed: f64, allowance_s: u64) -> MotionGoal {
    MotionGoal::along_heading(distance, speed, Duration::from_secs(allowance_s))
}

#[derive(Debug, Default)]
pub struct SimState {
    pub pose: Pose2D,
    pub now: Duration,
    pub pose_unavailable: bool,
    pub blocked: bool,
    pub pose_lookups: usize,
    pub checked: Vec<Twist>,
    pub published: Vec<Twist>,
}

/// Kinematic robot: every published command is executed for one control
/// period, advancing both pose and clock.
#[derive(Debug, Clone, Default)]
pub struct SimRobot {
    pub state: Rc<RefCell<SimState>>,
}

impl SimRobot {
    pub fn pose(&self) -> Pose2D {
        self.state.borrow().pose
    }

    pub fn published(&self) -> Vec<Twist> {
        self.state.borrow().published.clone()
    }

    pub fn last_published(&self) -> Option<Twist> {
        self.state.borrow().published.last().copied()
    }

    pub fn moving_commands(&self) -> Vec<Twist> {
        self.published().into_iter().filter(|t| !t.is_zero()).collect()
    }

    pub fn set_blocked(&self, blocked: bool) {
        self.state.borrow_mut().blocked = blocked;
    }

    pub fn set_pose_unavailable(&self, unavailable: bool) {
        self.state.borrow_mut().pose_unavailable = unavailable;
    }

    pub fn advance(&self, by: Duration) {
        self.state.borrow_mut().now += by;
    }
}

impl PoseProvider for SimRobot {
    fn current_pose(
        &self,
        global_frame: &str,
        robot_frame: &str,
        _tolerance: Duration,
    ) -> Result<Pose2D, PoseUnavailable> {
        let mut state = self.state.borrow_mut();
        state.pose_lookups += 1;
        if state.pose_unavailable {
            return Err(PoseUnavailable {
                global_frame: global_frame.to_owned(),
                robot_frame: robot_frame.to_owned(),
            });
        }
        Ok(state.pose)
    }
}

impl SafetyInterlock for SimRobot {
    fn is_command_safe(&self, _pose: &Pose2D, command: &Twist) -> bool {
        let mut state = self.state.borrow_mut();
        state.checked.push(*command);
        !state.blocked
    }
}

impl CommandSink for SimRobot {
    fn publish(&mut self, command: Twist) {
        let mut state = self.state.borrow_mut();
        state.published.push(command);
        if !command.is_zero() {
            state.pose = state.pose.advanced(command.linear_x * PERIOD.as_secs_f64());
            state.now += PERIOD;
        }
    }
}

impl Clock for SimRobot {
    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

use std::time::Duration;

use nav_core::{ActionResult, ErrorCode, Pose2D, ResultStatus, Twist};
use thiserror::Error;

use crate::config::BehaviorConfig;
use crate::primitives::{MotionCommand, MotionFeedback, MotionGoal, MotionPrimitive};
use crate::robot::MotionWorld;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Idle,
    Executing,
    Succeeded,
    Failed,
    Preempted,
}

impl MotionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            MotionPhase::Succeeded | MotionPhase::Failed | MotionPhase::Preempted
        )
    }
}

/// Per-invocation state, fixed when the goal is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionState {
    pub initial_pose: Pose2D,
    pub command: MotionCommand,
    /// Absolute clock time; never recomputed.
    pub deadline: Duration,
    pub disable_collision_checks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a motion goal is already executing")]
pub struct BehaviorBusy;

/// Closed-loop, time-bounded execution of one [`MotionPrimitive`].
///
/// [`start`](Self::start) validates the goal and captures the initial pose;
/// each [`cycle`](Self::cycle) then runs one control step:
/// 1. observe a pending cancel request (`Preempted`),
/// 2. check the time budget (`Timeout`),
/// 3. look up the current pose (`TfError`),
/// 4. unless disabled, ask the safety interlock about this step's command
///    (`CollisionAhead`),
/// 5. finish once the requested distance is covered,
/// 6. otherwise publish the command.
///
/// Every terminal transition publishes a zero twist. Terminal phases are
/// sticky until the next `start`.
#[derive(Debug)]
pub struct TimedMotionBehavior<M> {
    primitive: M,
    config: BehaviorConfig,
    phase: MotionPhase,
    state: Option<MotionState>,
    feedback: MotionFeedback,
    result: Option<ActionResult>,
    cancel_requested: bool,
}

impl<M> TimedMotionBehavior<M>
where
    M: MotionPrimitive,
{
    /// An invalid `config` is used as is, with each out-of-range value
    /// saturated where it is read; it never makes a control cycle panic.
    pub fn new(primitive: M, config: BehaviorConfig) -> Self {
        if let Err(err) = config.validate() {
            tracing::warn!(behavior = M::NAME, error = %err, "behavior config is invalid");
        }
        Self {
            primitive,
            config,
            phase: MotionPhase::Idle,
            state: None,
            feedback: MotionFeedback::default(),
            result: None,
            cancel_requested: false,
        }
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn config(&self) -> &BehaviorConfig {
        &self.config
    }

    pub fn state(&self) -> Option<&MotionState> {
        self.state.as_ref()
    }

    pub fn feedback(&self) -> MotionFeedback {
        self.feedback
    }

    /// Terminal result of the current invocation, once reached.
    pub fn result(&self) -> Option<&ActionResult> {
        self.result.as_ref()
    }

    /// Accept a new goal. Invalid input and an unavailable pose fail the
    /// invocation immediately; no motion command is issued in that case.
    pub fn start<R: MotionWorld>(
        &mut self,
        goal: &MotionGoal,
        robot: &mut R,
    ) -> Result<MotionPhase, BehaviorBusy> {
        if self.phase == MotionPhase::Executing {
            return Err(BehaviorBusy);
        }
        self.state = None;
        self.feedback = MotionFeedback::default();
        self.result = None;
        self.cancel_requested = false;

        let command = match self.primitive.validate(goal) {
            Ok(command) => command,
            Err(rejection) => {
                self.finish(robot, ActionResult::failed(rejection.code, rejection.message));
                return Ok(self.phase);
            }
        };

        let initial_pose = match robot.current_pose(
            &self.config.local_frame,
            &self.config.robot_base_frame,
            self.config.transform_tolerance(),
        ) {
            Ok(pose) => pose,
            Err(err) => {
                tracing::debug!(behavior = M::NAME, error = %err, "initial pose lookup failed");
                let message = "Initial robot pose is not available.";
                self.finish(robot, ActionResult::failed(ErrorCode::TfError, message));
                return Ok(self.phase);
            }
        };

        let Some(deadline) = robot.now().checked_add(goal.time_allowance) else {
            let message = format!(
                "Time allowance of {:?} cannot be represented as a deadline.",
                goal.time_allowance
            );
            self.finish(robot, ActionResult::failed(ErrorCode::InvalidInput, message));
            return Ok(self.phase);
        };
        tracing::info!(
            behavior = M::NAME,
            displacement = command.displacement,
            speed = command.speed,
            allowance_s = goal.time_allowance.as_secs_f64(),
            "motion goal accepted"
        );
        self.state = Some(MotionState {
            initial_pose,
            command,
            deadline,
            disable_collision_checks: goal.disable_collision_checks,
        });
        self.phase = MotionPhase::Executing;
        Ok(self.phase)
    }

    /// Ask the running invocation to stop; observed on the next cycle.
    /// Returns `false` when nothing is executing.
    pub fn request_cancel(&mut self) -> bool {
        if self.phase != MotionPhase::Executing {
            return false;
        }
        self.cancel_requested = true;
        true
    }

    /// Run one control step. A no-op outside `Executing`.
    pub fn cycle<R: MotionWorld>(&mut self, robot: &mut R) -> MotionPhase {
        if self.phase != MotionPhase::Executing {
            return self.phase;
        }
        let Some(state) = self.state.clone() else {
            self.finish(
                robot,
                ActionResult::failed(ErrorCode::Unknown, "motion state missing while executing"),
            );
            return self.phase;
        };

        if self.cancel_requested {
            tracing::info!(behavior = M::NAME, "motion preempted");
            self.finish(robot, ActionResult::canceled());
            return self.phase;
        }

        if robot.now() >= state.deadline {
            let message = format!(
                "Exceeded time allowance before reaching the {0} goal - Exiting {0}",
                M::NAME
            );
            self.finish(robot, ActionResult::failed(ErrorCode::Timeout, message));
            return self.phase;
        }

        let pose = match robot.current_pose(
            &self.config.local_frame,
            &self.config.robot_base_frame,
            self.config.transform_tolerance(),
        ) {
            Ok(pose) => pose,
            Err(err) => {
                tracing::debug!(behavior = M::NAME, error = %err, "pose lookup failed");
                let message = "Current robot pose is not available.";
                self.finish(robot, ActionResult::failed(ErrorCode::TfError, message));
                return self.phase;
            }
        };

        let traveled = state.initial_pose.distance(&pose);
        self.feedback = MotionFeedback {
            distance_traveled: traveled,
        };
        let remaining = state.command.displacement.abs() - traveled;
        let candidate = self.bounded_command(&state.command, remaining);

        if !state.disable_collision_checks && !robot.is_command_safe(&pose, &candidate) {
            let message = format!("Collision Ahead - Exiting {}", M::NAME);
            self.finish(robot, ActionResult::failed(ErrorCode::CollisionAhead, message));
            return self.phase;
        }

        if remaining <= 0.0 {
            tracing::info!(behavior = M::NAME, traveled, "motion goal reached");
            self.finish(robot, ActionResult::succeeded());
            return self.phase;
        }

        robot.publish(candidate);
        self.phase
    }

    /// This step's velocity: the commanded speed, clamped by `max_speed` and
    /// by what covers the remaining distance in one control period.
    fn bounded_command(&self, command: &MotionCommand, remaining: f64) -> Twist {
        let magnitude = command
            .speed
            .abs()
            .min(self.config.max_speed)
            .min(remaining.max(0.0) * self.config.cycle_frequency)
            .max(0.0);
        Twist::linear(magnitude.copysign(command.speed))
    }

    fn finish<R: MotionWorld>(&mut self, robot: &mut R, result: ActionResult) {
        robot.publish(Twist::zero());
        self.phase = match result.status {
            ResultStatus::Succeeded => MotionPhase::Succeeded,
            ResultStatus::Failed => MotionPhase::Failed,
            ResultStatus::Canceled => MotionPhase::Preempted,
        };
        if self.phase == MotionPhase::Failed {
            tracing::warn!(
                behavior = M::NAME,
                error_code = %result.error_code,
                message = %result.error_message,
                "motion failed"
            );
        }
        self.result = Some(result);
        self.cancel_requested = false;
    }
}

use std::collections::BTreeSet;

use nav_core::{ActionProvider, CancelAck, GoalHandle, ProviderPoll};

use crate::config::BehaviorConfig;
use crate::primitives::{MotionFeedback, MotionGoal, MotionPrimitive};
use crate::robot::MotionWorld;
use crate::timed::{MotionPhase, TimedMotionBehavior};

/// In-process action provider executing one motion behavior on one robot.
///
/// The control loop is driven by the caller: every `poll` of the active goal
/// runs exactly one cycle. Goals sent while another one is executing are
/// rejected.
#[derive(Debug)]
pub struct BehaviorServer<M, R> {
    behavior: TimedMotionBehavior<M>,
    robot: R,
    active: Option<GoalHandle>,
    rejected: BTreeSet<GoalHandle>,
    next_id: u64,
}

impl<M, R> BehaviorServer<M, R>
where
    M: MotionPrimitive,
    R: MotionWorld + 'static,
{
    pub fn new(primitive: M, config: BehaviorConfig, robot: R) -> Self {
        Self {
            behavior: TimedMotionBehavior::new(primitive, config),
            robot,
            active: None,
            rejected: BTreeSet::new(),
            next_id: 0,
        }
    }

    pub fn behavior(&self) -> &TimedMotionBehavior<M> {
        &self.behavior
    }

    pub fn robot(&self) -> &R {
        &self.robot
    }

    pub fn robot_mut(&mut self) -> &mut R {
        &mut self.robot
    }

    pub fn active_goal(&self) -> Option<GoalHandle> {
        self.active
    }
}

impl<M, R> ActionProvider for BehaviorServer<M, R>
where
    M: MotionPrimitive,
    R: MotionWorld + 'static,
{
    type Goal = MotionGoal;
    type Feedback = MotionFeedback;

    fn send(&mut self, goal: MotionGoal) -> GoalHandle {
        self.next_id += 1;
        let handle = GoalHandle(self.next_id);

        match self.behavior.start(&goal, &mut self.robot) {
            Ok(_) => self.active = Some(handle),
            Err(busy) => {
                tracing::warn!(behavior = M::NAME, goal = handle.0, error = %busy, "goal rejected");
                self.rejected.insert(handle);
            }
        }
        handle
    }

    fn poll(&mut self, handle: GoalHandle) -> ProviderPoll<MotionFeedback> {
        if self.rejected.remove(&handle) {
            return ProviderPoll::Rejected;
        }
        if self.active != Some(handle) {
            return ProviderPoll::Pending;
        }

        match self.behavior.cycle(&mut self.robot) {
            MotionPhase::Executing => ProviderPoll::Feedback(self.behavior.feedback()),
            MotionPhase::Idle => ProviderPoll::Pending,
            MotionPhase::Succeeded | MotionPhase::Failed | MotionPhase::Preempted => {
                self.active = None;
                match self.behavior.result() {
                    Some(result) => ProviderPoll::Finished(result.clone()),
                    None => ProviderPoll::Pending,
                }
            }
        }
    }

    fn cancel(&mut self, handle: GoalHandle) -> CancelAck {
        if self.active == Some(handle) && self.behavior.request_cancel() {
            CancelAck::Accepted
        } else {
            CancelAck::Rejected
        }
    }
}

use std::marker::PhantomData;

use nav_core::{
    ActionKey, ActionProvider, ActionResult, ActionRuntime, AdapterState, AsyncActionAdapter, BbKey,
    Blackboard, ErrorCode, GoalHandle, ResultStatus, TickContext,
};

use crate::bt::{BtNode, BtStatus};
use crate::ports::PortError;

type GoalFn<G> = Box<dyn FnMut(&Blackboard) -> Result<G, PortError>>;
type FeedbackFn<F> = Box<dyn FnMut(&F, &mut Blackboard)>;

/// Action-invocation node.
///
/// Drives the adapter registered under `key` in the [`ActionRuntime`]:
/// - `Idle`: builds the goal from the blackboard and starts it (`Running`).
/// - `Running` / `Canceling`: polls once and forwards feedback (`Running`).
/// - `Done`: takes the result; `Succeeded` and `Canceled` map to `Success`,
///   `Failed` to `Failure`.
///
/// When an error-code output is configured, the node writes
/// [`ErrorCode::None`] on success and the result's code on failure.
///
/// The node only reports results of goals it started itself. A goal left in
/// the adapter by an abandoned branch, or by another node registered under
/// the same key, is canceled and drained first; the node then starts its own.
pub struct ActionNode<P>
where
    P: ActionProvider,
{
    name: String,
    key: ActionKey,
    goal_fn: GoalFn<P::Goal>,
    feedback_fn: Option<FeedbackFn<P::Feedback>>,
    error_code: Option<BbKey<ErrorCode>>,
    last_result: Option<ActionResult>,
    /// Goal this node started and has not yet collected.
    invocation: Option<GoalHandle>,
    _provider: PhantomData<fn() -> P>,
}

impl<P> ActionNode<P>
where
    P: ActionProvider,
{
    pub fn new(
        name: impl Into<String>,
        key: ActionKey,
        goal_fn: impl FnMut(&Blackboard) -> Result<P::Goal, PortError> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            key,
            goal_fn: Box::new(goal_fn),
            feedback_fn: None,
            error_code: None,
            last_result: None,
            invocation: None,
            _provider: PhantomData,
        }
    }

    /// Write the terminal error code of every invocation to `key`.
    pub fn with_error_code_output(mut self, key: BbKey<ErrorCode>) -> Self {
        self.error_code = Some(key);
        self
    }

    /// Called with each new feedback snapshot.
    pub fn on_feedback(
        mut self,
        feedback_fn: impl FnMut(&P::Feedback, &mut Blackboard) + 'static,
    ) -> Self {
        self.feedback_fn = Some(Box::new(feedback_fn));
        self
    }

    pub fn key(&self) -> ActionKey {
        self.key
    }

    /// Result of the most recently completed invocation.
    pub fn last_result(&self) -> Option<&ActionResult> {
        self.last_result.as_ref()
    }

    fn write_error_code(&self, blackboard: &mut Blackboard, code: ErrorCode) {
        if let Some(key) = self.error_code.as_ref() {
            blackboard.set(key, code);
        }
    }

    fn deliver(
        &mut self,
        ctx: &TickContext,
        result: ActionResult,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        let status = match result.status {
            ResultStatus::Succeeded => {
                self.write_error_code(blackboard, ErrorCode::None);
                tracing::info!(node = %self.name, action = self.key.0, tick = ctx.tick, "action succeeded");
                BtStatus::Success
            }
            ResultStatus::Canceled => {
                tracing::info!(node = %self.name, action = self.key.0, tick = ctx.tick, "action canceled");
                BtStatus::Success
            }
            ResultStatus::Failed => {
                self.write_error_code(blackboard, result.error_code);
                tracing::warn!(
                    node = %self.name,
                    action = self.key.0,
                    tick = ctx.tick,
                    error_code = %result.error_code,
                    message = %result.error_message,
                    "action failed"
                );
                BtStatus::Failure
            }
        };
        self.last_result = Some(result);
        status
    }

    fn start_goal(
        &mut self,
        ctx: &TickContext,
        adapter: &mut AsyncActionAdapter<P>,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        let goal = match (self.goal_fn)(&*blackboard) {
            Ok(goal) => goal,
            Err(err) => {
                tracing::error!(
                    node = %self.name,
                    action = self.key.0,
                    error = %err,
                    "cannot build goal"
                );
                self.write_error_code(blackboard, ErrorCode::InvalidInput);
                return BtStatus::Failure;
            }
        };
        if let Err(err) = adapter.start(goal) {
            tracing::error!(
                node = %self.name,
                action = self.key.0,
                error = %err,
                "cannot start action"
            );
            self.write_error_code(blackboard, ErrorCode::Unknown);
            return BtStatus::Failure;
        }
        self.invocation = adapter.handle();
        tracing::info!(node = %self.name, action = self.key.0, tick = ctx.tick, "action started");
        BtStatus::Running
    }

    fn take_and_deliver(
        &mut self,
        ctx: &TickContext,
        adapter: &mut AsyncActionAdapter<P>,
        blackboard: &mut Blackboard,
    ) -> BtStatus {
        self.invocation = None;
        match adapter.take_result() {
            Ok(result) => self.deliver(ctx, result, blackboard),
            Err(err) => {
                tracing::error!(
                    node = %self.name,
                    action = self.key.0,
                    error = %err,
                    "cannot take result"
                );
                BtStatus::Failure
            }
        }
    }

    /// Retire a goal this node did not start: one preempted after its branch
    /// was abandoned, or one started by another node sharing the key. Returns
    /// `true` once the adapter is free for a new goal.
    fn drain_foreign(&self, ctx: &TickContext, adapter: &mut AsyncActionAdapter<P>) -> bool {
        if adapter.state() == AdapterState::Running {
            tracing::warn!(
                node = %self.name,
                action = self.key.0,
                tick = ctx.tick,
                "adapter is running a goal this node did not start; canceling it"
            );
            if let Err(err) = adapter.cancel() {
                tracing::error!(node = %self.name, error = %err, "cancel failed");
            }
        }
        if adapter.state().is_active() {
            adapter.tick();
        }
        if adapter.state() != AdapterState::Done {
            return false;
        }
        match adapter.take_result() {
            Ok(result) => tracing::debug!(
                node = %self.name,
                action = self.key.0,
                status = ?result.status,
                "discarded result of a goal this node did not start"
            ),
            Err(err) => {
                tracing::error!(node = %self.name, error = %err, "cannot discard result")
            }
        }
        true
    }
}

impl<P> BtNode for ActionNode<P>
where
    P: ActionProvider,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        actions: &mut ActionRuntime,
    ) -> BtStatus {
        let orphan = actions.orphaned_goal(self.key);
        let Some(adapter) = actions.request::<P>(self.key) else {
            tracing::error!(
                node = %self.name,
                action = self.key.0,
                "no adapter of the expected type is registered for this action"
            );
            self.write_error_code(blackboard, ErrorCode::Unknown);
            return BtStatus::Failure;
        };

        let owned = adapter.handle().is_some()
            && adapter.handle() == self.invocation
            && adapter.handle() != orphan;
        if !owned && adapter.state() != AdapterState::Idle {
            self.invocation = None;
            if !self.drain_foreign(ctx, adapter) {
                return BtStatus::Running;
            }
        }

        match adapter.state() {
            AdapterState::Idle => self.start_goal(ctx, adapter, blackboard),
            AdapterState::Running | AdapterState::Canceling => {
                let state = adapter.tick();
                if let (Some(feedback_fn), Some(feedback)) =
                    (self.feedback_fn.as_mut(), adapter.feedback())
                {
                    feedback_fn(feedback, blackboard);
                }
                if state != AdapterState::Done {
                    return BtStatus::Running;
                }
                self.take_and_deliver(ctx, adapter, blackboard)
            }
            AdapterState::Done => self.take_and_deliver(ctx, adapter, blackboard),
        }
    }

    /// Halted by the parent: whatever goal is outstanding is no longer ours.
    /// The runtime preempts it if nothing requests it again this tick.
    fn reset(&mut self) {
        self.invocation = None;
    }
}

/// Cancellation node: requests cancellation of whatever goal the adapter
/// under `key` is running, and always succeeds.
///
/// It does not wait for the cancellation to complete and never polls the
/// adapter; the owning [`ActionNode`] (or the runtime, if the owner is no
/// longer ticked) observes the terminal result.
pub struct CancelNode {
    name: String,
    key: ActionKey,
}

impl CancelNode {
    pub fn new(name: impl Into<String>, key: ActionKey) -> Self {
        Self {
            name: name.into(),
            key,
        }
    }

    pub fn key(&self) -> ActionKey {
        self.key
    }
}

impl BtNode for CancelNode {
    fn tick(
        &mut self,
        ctx: &TickContext,
        _blackboard: &mut Blackboard,
        actions: &mut ActionRuntime,
    ) -> BtStatus {
        let outcome = actions.cancel(self.key);
        tracing::debug!(
            node = %self.name,
            action = self.key.0,
            tick = ctx.tick,
            ?outcome,
            "cancel node ticked"
        );
        BtStatus::Success
    }

    fn reset(&mut self) {}
}

use crate::error::{AdapterMisuse, AdapterOp};
use crate::{ActionProvider, ActionResult, CancelAck, GoalHandle, ProviderPoll};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterState {
    Idle,
    Running,
    Canceling,
    Done,
}

impl AdapterState {
    /// A goal is outstanding at the provider.
    pub fn is_active(self) -> bool {
        matches!(self, AdapterState::Running | AdapterState::Canceling)
    }
}

/// Turns a request/feedback/result action into a pollable, tick-safe object.
///
/// Lifecycle: `start` → `tick`* → (`cancel` → `tick`*)? → `Done` →
/// `take_result` (back to `Idle`). Each `start` dispatches exactly one request
/// and each accepted `cancel` exactly one cancellation, however often the
/// caller ticks or retries.
pub struct AsyncActionAdapter<P>
where
    P: ActionProvider,
{
    provider: P,
    state: AdapterState,
    goal: Option<P::Goal>,
    handle: Option<GoalHandle>,
    feedback: Option<P::Feedback>,
    result: Option<ActionResult>,
}

impl<P> AsyncActionAdapter<P>
where
    P: ActionProvider,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: AdapterState::Idle,
            goal: None,
            handle: None,
            feedback: None,
            result: None,
        }
    }

    pub fn state(&self) -> AdapterState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == AdapterState::Done
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn provider_mut(&mut self) -> &mut P {
        &mut self.provider
    }

    /// Goal of the current invocation, if one was started.
    pub fn goal(&self) -> Option<&P::Goal> {
        self.goal.as_ref()
    }

    /// Handle of the current invocation, kept until its result is taken.
    pub fn handle(&self) -> Option<GoalHandle> {
        self.handle
    }

    /// Latest feedback snapshot of the current invocation.
    pub fn feedback(&self) -> Option<&P::Feedback> {
        self.feedback.as_ref()
    }

    pub fn start(&mut self, goal: P::Goal) -> Result<(), AdapterMisuse> {
        if self.state != AdapterState::Idle {
            return Err(AdapterMisuse::InvalidState {
                op: AdapterOp::Start,
                state: self.state,
            });
        }

        let handle = self.provider.send(goal.clone());
        tracing::debug!(handle = handle.0, "action goal sent");
        self.goal = Some(goal);
        self.handle = Some(handle);
        self.feedback = None;
        self.result = None;
        self.state = AdapterState::Running;
        Ok(())
    }

    /// Poll the provider once. A no-op unless a goal is outstanding.
    pub fn tick(&mut self) -> AdapterState {
        if !self.state.is_active() {
            return self.state;
        }
        let Some(handle) = self.handle else {
            return self.state;
        };

        match self.provider.poll(handle) {
            ProviderPoll::Pending => {}
            ProviderPoll::Feedback(feedback) => self.feedback = Some(feedback),
            ProviderPoll::Finished(result) => {
                tracing::debug!(
                    handle = handle.0,
                    status = ?result.status,
                    error_code = %result.error_code,
                    "action goal finished"
                );
                self.finish(result);
            }
            ProviderPoll::Rejected => {
                tracing::warn!(handle = handle.0, "action goal rejected");
                self.finish(ActionResult::rejected());
            }
        }
        self.state
    }

    /// Request cancellation without waiting for acknowledgment. Repeated
    /// calls while `Canceling` do not reach the provider again.
    pub fn cancel(&mut self) -> Result<(), AdapterMisuse> {
        match self.state {
            AdapterState::Idle | AdapterState::Done => Err(AdapterMisuse::InvalidState {
                op: AdapterOp::Cancel,
                state: self.state,
            }),
            AdapterState::Canceling => Ok(()),
            AdapterState::Running => {
                if let Some(handle) = self.handle {
                    let ack = self.provider.cancel(handle);
                    if ack == CancelAck::Rejected {
                        tracing::debug!(handle = handle.0, "cancel not acknowledged by provider");
                    }
                }
                self.state = AdapterState::Canceling;
                Ok(())
            }
        }
    }

    pub fn result(&self) -> Result<&ActionResult, AdapterMisuse> {
        match (&self.result, self.state) {
            (Some(result), AdapterState::Done) => Ok(result),
            (_, state) => Err(AdapterMisuse::NotReady { state }),
        }
    }

    /// Deliver the result to the caller and return to `Idle`.
    pub fn take_result(&mut self) -> Result<ActionResult, AdapterMisuse> {
        if self.state != AdapterState::Done {
            return Err(AdapterMisuse::NotReady { state: self.state });
        }
        let result = self
            .result
            .take()
            .ok_or(AdapterMisuse::NotReady { state: self.state })?;
        self.reset();
        Ok(result)
    }

    fn finish(&mut self, result: ActionResult) {
        self.result = Some(result);
        self.state = AdapterState::Done;
    }

    fn reset(&mut self) {
        self.state = AdapterState::Idle;
        self.goal = None;
        self.handle = None;
        self.feedback = None;
        self.result = None;
    }
}

use crate::ActionResult;

/// Provider-assigned identifier of one dispatched goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GoalHandle(pub u64);

/// Answer to a single non-blocking poll.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderPoll<F> {
    /// Nothing new since the last poll.
    Pending,
    /// Progress snapshot; the goal is still active.
    Feedback(F),
    /// Terminal outcome. Reported once per goal.
    Finished(ActionResult),
    /// The provider refused the goal.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelAck {
    Accepted,
    /// The provider does not know the goal or it already finished. The
    /// terminal result still arrives through `poll`.
    Rejected,
}

/// Abstract request/feedback/result action endpoint.
///
/// Every method must return promptly: `send` and `cancel` are fire-and-forget,
/// and outcomes are only observed through `poll`.
pub trait ActionProvider: 'static {
    type Goal: Clone + 'static;
    type Feedback: Clone + 'static;

    fn send(&mut self, goal: Self::Goal) -> GoalHandle;

    fn poll(&mut self, handle: GoalHandle) -> ProviderPoll<Self::Feedback>;

    fn cancel(&mut self, handle: GoalHandle) -> CancelAck;
}

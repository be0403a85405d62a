use nav_core::{ActionRuntime, Blackboard, TickContext};

use crate::bt::{BtNode, BtStatus};

/// Control-flow node over an ordered list of children.
///
/// `FALLBACK` picks the flow: a fallback stops at the first child that
/// succeeds, a sequence at the first child that fails. `REACTIVE` picks the
/// evaluation: a reactive node starts from the first child on every tick, so
/// a condition in front of a running action can abort it; a memory node
/// resumes the running child directly.
///
/// Halting is how actions get preempted. Whenever a different child takes
/// over, or the node itself finishes, the children are reset. An action node
/// that is reset forgets the goal it started, nothing requests that goal any
/// more, and the runtime cancels it at the end of the tick.
pub struct ControlNode<const FALLBACK: bool, const REACTIVE: bool> {
    children: Vec<Box<dyn BtNode>>,
    running: Option<usize>,
}

/// Fallback re-evaluated from the first child on every tick.
pub type ReactiveSelector = ControlNode<true, true>;
/// Sequence re-evaluated from the first child on every tick.
pub type ReactiveSequence = ControlNode<false, true>;
/// Fallback with memory.
pub type Selector = ControlNode<true, false>;
/// Sequence with memory.
pub type Sequence = ControlNode<false, false>;

impl<const FALLBACK: bool, const REACTIVE: bool> ControlNode<FALLBACK, REACTIVE> {
    pub fn new(children: Vec<Box<dyn BtNode>>) -> Self {
        Self {
            children,
            running: None,
        }
    }

    /// Child status that ends the node early: `Success` for a fallback,
    /// `Failure` for a sequence.
    const fn decisive() -> BtStatus {
        if FALLBACK {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }

    fn finish(&mut self, status: BtStatus) -> BtStatus {
        self.reset();
        status
    }
}

impl<const FALLBACK: bool, const REACTIVE: bool> BtNode for ControlNode<FALLBACK, REACTIVE> {
    fn tick(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        actions: &mut ActionRuntime,
    ) -> BtStatus {
        let first = if REACTIVE {
            0
        } else {
            self.running.unwrap_or(0)
        };

        for i in first..self.children.len() {
            match self.children[i].tick(ctx, blackboard, actions) {
                BtStatus::Running => {
                    if let Some(halted) = self.running.filter(|&prev| prev != i) {
                        tracing::trace!(tick = ctx.tick, halted, running = i, "child preempted");
                        self.children[halted].reset();
                    }
                    self.running = Some(i);
                    return BtStatus::Running;
                }
                status if status == Self::decisive() => return self.finish(status),
                _ => {}
            }
        }

        // Every child took the non-decisive outcome.
        let exhausted = if FALLBACK {
            BtStatus::Failure
        } else {
            BtStatus::Success
        };
        self.finish(exhausted)
    }

    fn reset(&mut self) {
        self.running = None;
        for child in &mut self.children {
            child.reset();
        }
    }
}

/// Leaf evaluating a predicate over the blackboard; never touches actions.
pub struct Condition<F> {
    predicate: F,
}

impl<F> Condition<F>
where
    F: FnMut(&TickContext, &Blackboard) -> bool + 'static,
{
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<F> BtNode for Condition<F>
where
    F: FnMut(&TickContext, &Blackboard) -> bool + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        _actions: &mut ActionRuntime,
    ) -> BtStatus {
        if (self.predicate)(ctx, blackboard) {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }

    fn reset(&mut self) {}
}

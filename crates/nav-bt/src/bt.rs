use nav_core::{ActionRuntime, Blackboard, TickContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BtStatus {
    Running,
    Success,
    Failure,
}

impl BtStatus {
    pub fn is_terminal(self) -> bool {
        self != BtStatus::Running
    }
}

/// A tree node. `tick` must return promptly and never panic on bad input;
/// failures are reported as [`BtStatus::Failure`].
pub trait BtNode: 'static {
    fn tick(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        actions: &mut ActionRuntime,
    ) -> BtStatus;

    fn reset(&mut self);
}

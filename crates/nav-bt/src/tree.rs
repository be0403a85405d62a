use nav_core::{ActionRuntime, Blackboard, TickContext};

use crate::bt::{BtNode, BtStatus};

/// A root node together with the blackboard and action runtime it ticks
/// against.
pub struct BehaviorTree {
    root: Box<dyn BtNode>,
    pub blackboard: Blackboard,
    pub actions: ActionRuntime,
    last: BtStatus,
}

impl BehaviorTree {
    pub fn new(root: Box<dyn BtNode>, blackboard: Blackboard, actions: ActionRuntime) -> Self {
        Self {
            root,
            blackboard,
            actions,
            last: BtStatus::Running,
        }
    }

    pub fn last_status(&self) -> BtStatus {
        self.last
    }

    /// Tick the root once, then preempt actions that no node requested.
    /// A terminal status resets the tree for the next run.
    pub fn tick_once(&mut self, ctx: &TickContext) -> BtStatus {
        self.actions.begin_tick();
        self.last = self.root.tick(ctx, &mut self.blackboard, &mut self.actions);
        self.actions.preempt_unrequested(ctx);
        if self.last.is_terminal() {
            self.root.reset();
        }
        self.last
    }

    /// Tick until the root returns a terminal status or `max_ticks` elapse.
    pub fn tick_while_running(&mut self, start: TickContext, max_ticks: u64) -> BtStatus {
        let mut ctx = start;
        for _ in 0..max_ticks {
            if self.tick_once(&ctx).is_terminal() {
                return self.last;
            }
            ctx = ctx.next();
        }
        self.last
    }
}

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use nav_core::{ActionProvider, ActionResult, CancelAck, GoalHandle, ProviderPoll};

#[derive(Debug, Default)]
pub struct ProviderLog {
    pub sent: Vec<u32>,
    pub polls: usize,
    pub cancels: Vec<GoalHandle>,
    pub script: VecDeque<ProviderPoll<u32>>,
}

/// Provider that replays a fixed script of poll answers. `Pending` once the
/// script is exhausted.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    pub log: Rc<RefCell<ProviderLog>>,
    next_id: u64,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, answer: ProviderPoll<u32>) {
        self.log.borrow_mut().script.push_back(answer);
    }

    pub fn finish_with(&self, result: ActionResult) {
        self.push(ProviderPoll::Finished(result));
    }
}

impl ActionProvider for ScriptedProvider {
    type Goal = u32;
    type Feedback = u32;

    fn send(&mut self, goal: u32) -> GoalHandle {
        self.next_id += 1;
        self.log.borrow_mut().sent.push(goal);
        GoalHandle(self.next_id)
    }

    fn poll(&mut self, _handle: GoalHandle) -> ProviderPoll<u32> {
        let mut log = self.log.borrow_mut();
        log.polls += 1;
        log.script.pop_front().unwrap_or(ProviderPoll::Pending)
    }

    fn cancel(&mut self, handle: GoalHandle) -> CancelAck {
        self.log.borrow_mut().cancels.push(handle);
        CancelAck::Accepted
    }
}

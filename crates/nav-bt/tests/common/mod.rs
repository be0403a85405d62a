#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use nav_core::{
    ActionKey, ActionProvider, ActionResult, ActionRuntime, AsyncActionAdapter, CancelAck,
    GoalHandle, ProviderPoll,
};

pub const ROUTE: ActionKey = ActionKey("compute_and_track_route");

#[derive(Debug, Default)]
pub struct ProviderLog {
    pub sent: Vec<f64>,
    pub polls: usize,
    pub cancels: usize,
    pub script: VecDeque<ProviderPoll<f64>>,
}

/// Scripted action endpoint: goals are distances, feedback is distance
/// remaining. Replays queued poll answers, then stays `Pending`.
#[derive(Debug, Clone, Default)]
pub struct FakeRoute {
    pub log: Rc<RefCell<ProviderLog>>,
    next_id: u64,
}

impl FakeRoute {
    pub fn push(&self, answer: ProviderPoll<f64>) {
        self.log.borrow_mut().script.push_back(answer);
    }

    pub fn finish_with(&self, result: ActionResult) {
        self.push(ProviderPoll::Finished(result));
    }

    pub fn sent(&self) -> usize {
        self.log.borrow().sent.len()
    }

    pub fn cancels(&self) -> usize {
        self.log.borrow().cancels
    }
}

impl ActionProvider for FakeRoute {
    type Goal = f64;
    type Feedback = f64;

    fn send(&mut self, goal: f64) -> GoalHandle {
        self.next_id += 1;
        self.log.borrow_mut().sent.push(goal);
        GoalHandle(self.next_id)
    }

    fn poll(&mut self, _handle: GoalHandle) -> ProviderPoll<f64> {
        let mut log = self.log.borrow_mut();
        log.polls += 1;
        log.script.pop_front().unwrap_or(ProviderPoll::Pending)
    }

    fn cancel(&mut self, _handle: GoalHandle) -> CancelAck {
        self.log.borrow_mut().cancels += 1;
        CancelAck::Accepted
    }
}

pub fn runtime_with(route: &FakeRoute) -> ActionRuntime {
    let mut runtime = ActionRuntime::new();
    runtime.register(ROUTE, AsyncActionAdapter::new(route.clone()));
    runtime
}

mod common;

use common::{runtime_with, FakeRoute, ROUTE};
use nav_bt::{ActionNode, BtNode, BtStatus, CancelNode};
use nav_core::{
    ActionKey, ActionResult, ActionRuntime, AdapterState, Blackboard, ResultStatus, TickContext,
};

fn ctx(tick: u64) -> TickContext {
    TickContext::new(tick, 0.1)
}

#[test]
fn cancel_with_nothing_running_is_a_successful_noop() {
    let route = FakeRoute::default();
    let mut actions = runtime_with(&route);
    let mut bb = Blackboard::new();
    let mut cancel = CancelNode::new("cancel_route", ROUTE);

    assert_eq!(cancel.tick(&ctx(0), &mut bb, &mut actions), BtStatus::Success);
    assert_eq!(route.cancels(), 0);
    assert_eq!(actions.state(ROUTE), Some(AdapterState::Idle));
}

#[test]
fn cancel_of_an_unregistered_action_succeeds() {
    let mut actions = ActionRuntime::new();
    let mut bb = Blackboard::new();
    let mut cancel = CancelNode::new("cancel_spin", ActionKey("spin"));
    assert_eq!(cancel.tick(&ctx(0), &mut bb, &mut actions), BtStatus::Success);
}

#[test]
fn cancel_requests_once_and_leaves_polling_to_the_owner() {
    let route = FakeRoute::default();
    let mut actions = runtime_with(&route);
    let mut bb = Blackboard::new();
    let mut owner = ActionNode::<FakeRoute>::new("route", ROUTE, |_bb: &Blackboard| Ok(5.0));
    let mut cancel = CancelNode::new("cancel_route", ROUTE);

    assert_eq!(owner.tick(&ctx(0), &mut bb, &mut actions), BtStatus::Running);

    assert_eq!(cancel.tick(&ctx(1), &mut bb, &mut actions), BtStatus::Success);
    assert_eq!(cancel.tick(&ctx(2), &mut bb, &mut actions), BtStatus::Success);
    assert_eq!(route.cancels(), 1);
    assert_eq!(route.log.borrow().polls, 0);
    assert_eq!(actions.state(ROUTE), Some(AdapterState::Canceling));

    // The owner is still running until the provider confirms.
    assert_eq!(owner.tick(&ctx(3), &mut bb, &mut actions), BtStatus::Running);
    route.finish_with(ActionResult::canceled());
    assert_eq!(owner.tick(&ctx(4), &mut bb, &mut actions), BtStatus::Success);
    assert_eq!(
        owner.last_result().map(|r| r.status),
        Some(ResultStatus::Canceled)
    );
}

#[test]
fn completion_racing_a_cancel_keeps_the_provider_outcome() {
    let route = FakeRoute::default();
    let mut actions = runtime_with(&route);
    let mut bb = Blackboard::new();
    let mut owner = ActionNode::<FakeRoute>::new("route", ROUTE, |_bb: &Blackboard| Ok(5.0));
    let mut cancel = CancelNode::new("cancel_route", ROUTE);

    owner.tick(&ctx(0), &mut bb, &mut actions);
    route.finish_with(ActionResult::succeeded());
    cancel.tick(&ctx(1), &mut bb, &mut actions);
    assert_eq!(owner.tick(&ctx(1), &mut bb, &mut actions), BtStatus::Success);
    assert_eq!(
        owner.last_result().map(|r| r.status),
        Some(ResultStatus::Succeeded)
    );
}

mod common;

use common::{config, goal, SimRobot};
use nav_behaviors::{BackUp, BehaviorServer, DriveOnHeading, MotionPhase};
use nav_core::{
    ActionProvider, ActionResult, AdapterState, AsyncActionAdapter, CancelAck, ErrorCode,
    ProviderPoll, ResultStatus,
};

#[test]
fn each_poll_runs_one_control_cycle() {
    let robot = SimRobot::default();
    let mut server = BehaviorServer::new(BackUp, config(), robot.clone());
    let handle = server.send(goal(0.5, 0.25, 10));

    assert_eq!(robot.published().len(), 0);
    for expected in 1..=3 {
        match server.poll(handle) {
            ProviderPoll::Feedback(feedback) => {
                assert_eq!(feedback.distance_traveled, 0.03125 * f64::from(expected - 1));
            }
            other => panic!("unexpected poll answer {other:?}"),
        }
        assert_eq!(robot.published().len(), expected as usize);
    }
}

#[test]
fn adapter_drives_backup_to_completion() {
    let robot = SimRobot::default();
    let mut adapter = AsyncActionAdapter::new(BehaviorServer::new(BackUp, config(), robot.clone()));
    adapter.start(goal(0.5, 0.25, 10)).unwrap();

    let mut ticks = 0;
    while adapter.tick() != AdapterState::Done {
        ticks += 1;
        assert!(ticks < 50, "backup never finished");
    }
    assert_eq!(adapter.result().unwrap(), &ActionResult::succeeded());
    assert_eq!(robot.pose().x, -0.5);
    assert_eq!(adapter.provider().active_goal(), None);
}

#[test]
fn invalid_goal_finishes_on_first_poll() {
    let robot = SimRobot::default();
    let mut adapter =
        AsyncActionAdapter::new(BehaviorServer::new(DriveOnHeading, config(), robot.clone()));
    adapter.start(goal(0.5, -0.25, 10)).unwrap();

    assert_eq!(adapter.tick(), AdapterState::Done);
    let result = adapter.take_result().unwrap();
    assert_eq!(result.error_code, ErrorCode::InvalidInput);
    assert_eq!(result.error_message, "Speed and command sign did not match");
    assert!(robot.moving_commands().is_empty());
}

#[test]
fn goal_sent_while_executing_is_rejected() {
    let robot = SimRobot::default();
    let mut server = BehaviorServer::new(BackUp, config(), robot);
    let first = server.send(goal(0.5, 0.25, 10));
    let second = server.send(goal(0.2, 0.25, 10));

    assert_eq!(server.poll(second), ProviderPoll::Rejected);
    assert_eq!(server.active_goal(), Some(first));
    assert!(matches!(server.poll(first), ProviderPoll::Feedback(_)));
    assert_eq!(server.cancel(second), CancelAck::Rejected);
}

#[test]
fn adapter_cancel_preempts_and_stops_the_robot() {
    let robot = SimRobot::default();
    let mut adapter = AsyncActionAdapter::new(BehaviorServer::new(BackUp, config(), robot.clone()));
    adapter.start(goal(0.5, 0.25, 10)).unwrap();
    adapter.tick();
    adapter.tick();

    adapter.cancel().unwrap();
    assert_eq!(adapter.state(), AdapterState::Canceling);
    assert_eq!(adapter.tick(), AdapterState::Done);
    assert_eq!(adapter.result().unwrap().status, ResultStatus::Canceled);
    assert_eq!(adapter.provider().behavior().phase(), MotionPhase::Preempted);
    assert_eq!(robot.last_published().map(|t| t.is_zero()), Some(true));
    assert_eq!(robot.pose().x, -0.0625);

    // Nothing left to cancel.
    let handle = nav_core::GoalHandle(1);
    assert_eq!(adapter.provider_mut().cancel(handle), CancelAck::Rejected);
}

//! Tree-node wiring for the motion behaviors.

use std::time::Duration;

use nav_bt::{BehaviorTreeFactory, NodeConfig, PortError, PortValue};
use nav_core::{ActionKey, Blackboard};

use crate::primitives::{BackUp, DriveOnHeading, MotionGoal};
use crate::robot::MotionWorld;
use crate::server::BehaviorServer;

pub const BACK_UP: ActionKey = ActionKey("backup");
pub const DRIVE_ON_HEADING: ActionKey = ActionKey("drive_on_heading");

const DEFAULT_DISTANCE: f64 = 0.15;
const DEFAULT_SPEED: f64 = 0.025;
const DEFAULT_TIME_ALLOWANCE: f64 = 10.0;

/// Register `BackUp`, `DriveOnHeading` and their `Cancel*` nodes for servers
/// driving a robot of type `R`.
///
/// The servers themselves are registered in the tree's `ActionRuntime` under
/// [`BACK_UP`] and [`DRIVE_ON_HEADING`].
pub fn register_motion_nodes<R>(factory: &mut BehaviorTreeFactory)
where
    R: MotionWorld + 'static,
{
    factory.register_action::<BehaviorServer<BackUp, R>, _, _>(
        "BackUp",
        BACK_UP,
        |config: &NodeConfig| motion_goal_from_ports(config, "backup_dist", "backup_speed"),
    );
    factory.register_cancel("CancelBackUp", BACK_UP);

    factory.register_action::<BehaviorServer<DriveOnHeading, R>, _, _>(
        "DriveOnHeading",
        DRIVE_ON_HEADING,
        |config: &NodeConfig| motion_goal_from_ports(config, "dist_to_travel", "speed"),
    );
    factory.register_cancel("CancelDriveOnHeading", DRIVE_ON_HEADING);
}

/// Ports: `<distance_port>`, `<speed_port>`, `time_allowance` (seconds) and
/// `disable_collision_checks`. Remapped ports are read on every new goal.
fn motion_goal_from_ports(
    config: &NodeConfig,
    distance_port: &str,
    speed_port: &str,
) -> Result<impl FnMut(&Blackboard) -> Result<MotionGoal, PortError> + 'static, PortError> {
    let distance: PortValue<f64> =
        config.input_or(distance_port, PortValue::Literal(DEFAULT_DISTANCE))?;
    let speed: PortValue<f64> = config.input_or(speed_port, PortValue::Literal(DEFAULT_SPEED))?;
    let allowance: PortValue<f64> =
        config.input_or("time_allowance", PortValue::Literal(DEFAULT_TIME_ALLOWANCE))?;
    let unchecked: PortValue<bool> =
        config.input_or("disable_collision_checks", PortValue::Literal(false))?;
    let node = config.name.clone();

    Ok(move |blackboard: &Blackboard| {
        let seconds = allowance.resolve(blackboard)?;
        let time_allowance =
            Duration::try_from_secs_f64(seconds).map_err(|e| PortError::Parse {
                node: node.clone(),
                port: "time_allowance".to_owned(),
                value: seconds.to_string(),
                reason: e.to_string(),
            })?;
        let mut goal = MotionGoal::along_heading(
            distance.resolve(blackboard)?,
            speed.resolve(blackboard)?,
            time_allowance,
        );
        goal.disable_collision_checks = unchecked.resolve(blackboard)?;
        Ok(goal)
    })
}

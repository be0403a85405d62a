//! Bounded-duration motion behaviors (back up, drive on heading) executed as
//! pollable actions.

#![forbid(unsafe_code)]

pub mod bt;
pub mod config;
pub mod primitives;
pub mod robot;
pub mod server;
pub mod timed;

pub use bt::{register_motion_nodes, BACK_UP, DRIVE_ON_HEADING};
pub use config::BehaviorConfig;
pub use primitives::{
    BackUp, DriveOnHeading, MotionCommand, MotionFeedback, MotionGoal, MotionPrimitive, Rejection,
};
pub use robot::{Clock, CommandSink, MotionWorld, PoseProvider, PoseUnavailable, SafetyInterlock};
pub use server::BehaviorServer;
pub use timed::{BehaviorBusy, MotionPhase, MotionState, TimedMotionBehavior};

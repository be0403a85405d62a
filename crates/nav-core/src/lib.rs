//! Tick-driven action adapter primitives for robot behavior trees.
//!
//! Everything here is synchronous: long-running robot actions are modeled as
//! explicit adapter state that a tree polls once per tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod adapter;
pub mod blackboard;
pub mod error;
pub mod geometry;
pub mod provider;
pub mod runtime;
pub mod tick;

pub use action::{ActionKey, ActionResult, ErrorCode, FailureKind, ResultStatus, UnknownErrorCode};
pub use adapter::{AdapterState, AsyncActionAdapter};
pub use blackboard::{BbKey, Blackboard};
pub use error::{AdapterMisuse, AdapterOp, BlackboardError};
pub use geometry::{Pose2D, Twist, Vector3};
pub use provider::{ActionProvider, CancelAck, GoalHandle, ProviderPoll};
pub use runtime::{ActionRuntime, CancelOutcome, ErasedAdapter};
pub use tick::TickContext;

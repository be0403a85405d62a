//! Behavior Tree nodes that drive asynchronous robot actions from a
//! synchronous tick.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![forbid(unsafe_code)]

pub mod action;
pub mod bt;
pub mod conditions;
pub mod factory;
pub mod nodes;
pub mod ports;
pub mod tree;

pub use action::{ActionNode, CancelNode};
pub use bt::{BtNode, BtStatus};
pub use conditions::{
    would_a_route_recovery_help, would_a_route_recovery_help_node, AreErrorCodesPresent,
    ErrorCodeCondition, ERROR_CODE,
};
pub use factory::{BehaviorTreeFactory, FactoryError, TreeSpec};
// `Selector` / `Sequence` re-evaluate earlier children every tick, so a
// condition turning false preempts the running action below it. The memory
// variants resume the running child directly.
pub use nodes::{
    Condition, ControlNode, ReactiveSelector, ReactiveSequence, Selector as MemSelector,
    Sequence as MemSequence,
};
pub use nodes::{ReactiveSelector as Selector, ReactiveSequence as Sequence};
pub use ports::{NodeConfig, PortError, PortValue};
pub use tree::BehaviorTree;

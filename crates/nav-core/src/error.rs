use core::fmt;

use thiserror::Error;

use crate::adapter::AdapterState;

/// Adapter operation named in misuse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterOp {
    Start,
    Cancel,
}

impl fmt::Display for AdapterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterOp::Start => f.write_str("start"),
            AdapterOp::Cancel => f.write_str("cancel"),
        }
    }
}

/// Programming error: an adapter operation was called in a state that does
/// not permit it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AdapterMisuse {
    #[error("cannot {op} while adapter is {state:?}")]
    InvalidState { op: AdapterOp, state: AdapterState },

    #[error("result not ready (adapter is {state:?})")]
    NotReady { state: AdapterState },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlackboardError {
    #[error("blackboard type mismatch for key `{key}` (requested {requested})")]
    TypeMismatch { key: String, requested: &'static str },
}

impl BlackboardError {
    pub(crate) fn type_mismatch<T>(key: &str) -> Self {
        BlackboardError::TypeMismatch {
            key: key.to_owned(),
            requested: core::any::type_name::<T>(),
        }
    }
}

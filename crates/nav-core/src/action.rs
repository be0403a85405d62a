use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Action-type identifier shared by an action node, its cancel node and the
/// adapter registered in the [`ActionRuntime`](crate::ActionRuntime).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ActionKey(pub &'static str);

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Machine-checkable reason attached to a terminal [`ActionResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u16)]
pub enum ErrorCode {
    None = 0,
    Unknown = 1,
    InvalidInput = 2,
    TfError = 3,
    Timeout = 4,
    CollisionAhead = 5,
    Rejected = 6,
    NoValidRoute = 7,
    NoValidGraph = 8,
    IndeterminantNodesOnGraph = 9,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 10] = [
        ErrorCode::None,
        ErrorCode::Unknown,
        ErrorCode::InvalidInput,
        ErrorCode::TfError,
        ErrorCode::Timeout,
        ErrorCode::CollisionAhead,
        ErrorCode::Rejected,
        ErrorCode::NoValidRoute,
        ErrorCode::NoValidGraph,
        ErrorCode::IndeterminantNodesOnGraph,
    ];

    pub fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::None => "NONE",
            ErrorCode::Unknown => "UNKNOWN",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::TfError => "TF_ERROR",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::CollisionAhead => "COLLISION_AHEAD",
            ErrorCode::Rejected => "REJECTED",
            ErrorCode::NoValidRoute => "NO_VALID_ROUTE",
            ErrorCode::NoValidGraph => "NO_VALID_GRAPH",
            ErrorCode::IndeterminantNodesOnGraph => "INDETERMINANT_NODES_ON_GRAPH",
        }
    }

    pub fn is_error(self) -> bool {
        self != ErrorCode::None
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code `{0}`")]
pub struct UnknownErrorCode(pub String);

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    /// Accepts either the symbolic name (`NO_VALID_ROUTE`) or the numeric code.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<u16>() {
            return Self::from_code(code).ok_or_else(|| UnknownErrorCode(s.to_owned()));
        }
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResultStatus {
    Succeeded,
    Failed,
    Canceled,
}

/// Terminal outcome of one action invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ActionResult {
    pub status: ResultStatus,
    pub error_code: ErrorCode,
    /// Operator-facing diagnosis; empty unless `status` is `Failed`.
    pub error_message: String,
}

impl ActionResult {
    pub fn succeeded() -> Self {
        Self {
            status: ResultStatus::Succeeded,
            error_code: ErrorCode::None,
            error_message: String::new(),
        }
    }

    pub fn failed(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Failed,
            error_code,
            error_message: message.into(),
        }
    }

    pub fn canceled() -> Self {
        Self {
            status: ResultStatus::Canceled,
            error_code: ErrorCode::None,
            error_message: String::new(),
        }
    }

    pub fn rejected() -> Self {
        Self::failed(ErrorCode::Rejected, "goal was rejected by the action provider")
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Succeeded
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        FailureKind::of(self)
    }
}

/// Coarse failure taxonomy used for diagnosis and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    InvalidInput,
    PoseUnavailable,
    Timeout,
    CollisionDetected,
    ProviderRejected,
    Canceled,
    AdapterMisuse,
    /// Failure reported by the provider with a code outside the categories above.
    Other,
}

impl FailureKind {
    /// `None` for a successful result. Adapter misuse never produces a result,
    /// so it is never returned here.
    pub fn of(result: &ActionResult) -> Option<Self> {
        match result.status {
            ResultStatus::Succeeded => None,
            ResultStatus::Canceled => Some(FailureKind::Canceled),
            ResultStatus::Failed => Some(match result.error_code {
                ErrorCode::InvalidInput => FailureKind::InvalidInput,
                ErrorCode::TfError => FailureKind::PoseUnavailable,
                ErrorCode::Timeout => FailureKind::Timeout,
                ErrorCode::CollisionAhead => FailureKind::CollisionDetected,
                ErrorCode::Rejected => FailureKind::ProviderRejected,
                ErrorCode::None
                | ErrorCode::Unknown
                | ErrorCode::NoValidRoute
                | ErrorCode::NoValidGraph
                | ErrorCode::IndeterminantNodesOnGraph => FailureKind::Other,
            }),
        }
    }
}

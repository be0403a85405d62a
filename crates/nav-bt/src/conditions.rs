use std::collections::BTreeSet;

use nav_core::{ActionRuntime, BbKey, Blackboard, ErrorCode, TickContext};

use crate::bt::{BtNode, BtStatus};

/// Blackboard entry the owning action nodes write their terminal code to.
pub const ERROR_CODE: BbKey<ErrorCode> = BbKey::new("error_code");

/// Would a route recovery (re-planning, clearing costmaps, ...) plausibly
/// help after a failure reporting `code`?
///
/// Kept as an exhaustive table: adding an [`ErrorCode`] variant must be a
/// compile error here until the new code is classified.
pub fn would_a_route_recovery_help(code: ErrorCode) -> bool {
    match code {
        ErrorCode::None => false,
        ErrorCode::Unknown => true,
        ErrorCode::NoValidRoute => true,
        ErrorCode::Timeout => true,
        ErrorCode::IndeterminantNodesOnGraph => true,
        ErrorCode::InvalidInput => false,
        ErrorCode::TfError => false,
        ErrorCode::CollisionAhead => false,
        ErrorCode::Rejected => false,
        ErrorCode::NoValidGraph => false,
    }
}

/// Condition over the error code stored at a blackboard key.
///
/// `Success` when the classifier returns `true`. A missing or mistyped entry
/// is `Failure`.
pub struct ErrorCodeCondition<F> {
    name: String,
    key: BbKey<ErrorCode>,
    classify: F,
}

impl<F> ErrorCodeCondition<F>
where
    F: FnMut(ErrorCode) -> bool + 'static,
{
    pub fn new(name: impl Into<String>, key: BbKey<ErrorCode>, classify: F) -> Self {
        Self {
            name: name.into(),
            key,
            classify,
        }
    }
}

/// `WouldARouteRecoveryHelp` condition node.
pub fn would_a_route_recovery_help_node(
    name: impl Into<String>,
    key: BbKey<ErrorCode>,
) -> ErrorCodeCondition<fn(ErrorCode) -> bool> {
    ErrorCodeCondition::new(name, key, would_a_route_recovery_help as fn(ErrorCode) -> bool)
}

impl<F> BtNode for ErrorCodeCondition<F>
where
    F: FnMut(ErrorCode) -> bool + 'static,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        _actions: &mut ActionRuntime,
    ) -> BtStatus {
        let code = match blackboard.get(&self.key) {
            Ok(Some(code)) => *code,
            Ok(None) => {
                tracing::warn!(node = %self.name, key = self.key.name(), tick = ctx.tick, "error code not set");
                return BtStatus::Failure;
            }
            Err(err) => {
                tracing::warn!(node = %self.name, tick = ctx.tick, error = %err, "cannot read error code");
                return BtStatus::Failure;
            }
        };

        if (self.classify)(code) {
            BtStatus::Success
        } else {
            BtStatus::Failure
        }
    }

    fn reset(&mut self) {}
}

/// `Success` when the stored error code is one of `codes`.
pub struct AreErrorCodesPresent {
    inner: ErrorCodeCondition<Box<dyn FnMut(ErrorCode) -> bool>>,
}

impl AreErrorCodesPresent {
    pub fn new(
        name: impl Into<String>,
        key: BbKey<ErrorCode>,
        codes: impl IntoIterator<Item = ErrorCode>,
    ) -> Self {
        let codes: BTreeSet<ErrorCode> = codes.into_iter().collect();
        Self {
            inner: ErrorCodeCondition::new(
                name,
                key,
                Box::new(move |code| codes.contains(&code)) as Box<dyn FnMut(ErrorCode) -> bool>,
            ),
        }
    }
}

impl BtNode for AreErrorCodesPresent {
    fn tick(
        &mut self,
        ctx: &TickContext,
        blackboard: &mut Blackboard,
        actions: &mut ActionRuntime,
    ) -> BtStatus {
        self.inner.tick(ctx, blackboard, actions)
    }

    fn reset(&mut self) {
        self.inner.reset();
    }
}

use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    ActionKey, ActionProvider, ActionResult, AdapterMisuse, AdapterState, AsyncActionAdapter,
    GoalHandle, TickContext,
};

/// Object-safe view of an [`AsyncActionAdapter`] of any provider type.
pub trait ErasedAdapter: Any {
    fn state(&self) -> AdapterState;
    fn handle(&self) -> Option<GoalHandle>;
    fn tick(&mut self) -> AdapterState;
    fn cancel(&mut self) -> Result<(), AdapterMisuse>;
    fn take_result(&mut self) -> Result<ActionResult, AdapterMisuse>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<P> ErasedAdapter for AsyncActionAdapter<P>
where
    P: ActionProvider,
{
    fn state(&self) -> AdapterState {
        AsyncActionAdapter::state(self)
    }

    fn handle(&self) -> Option<GoalHandle> {
        AsyncActionAdapter::handle(self)
    }

    fn tick(&mut self) -> AdapterState {
        AsyncActionAdapter::tick(self)
    }

    fn cancel(&mut self) -> Result<(), AdapterMisuse> {
        AsyncActionAdapter::cancel(self)
    }

    fn take_result(&mut self) -> Result<ActionResult, AdapterMisuse> {
        AsyncActionAdapter::take_result(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What [`ActionRuntime::cancel`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// A cancellation was sent to the provider.
    Requested,
    /// A cancellation was already in flight; nothing was sent.
    AlreadyCanceling,
    /// The adapter has no outstanding goal.
    NotRunning,
    /// No adapter is registered under the key.
    Unregistered,
}

/// Adapters shared by the nodes of one tree, keyed by action identifier.
///
/// Action nodes reach their adapter through [`request`](Self::request), which
/// also records that the adapter is still wanted this tick. After the tree
/// tick, [`preempt_unrequested`](Self::preempt_unrequested) cancels adapters
/// whose owner was not ticked (its branch was abandoned) and keeps polling
/// them until the provider reports a terminal result, which is discarded.
///
/// A goal preempted this way stays *orphaned* until it is drained: an action
/// node re-entering its branch in the meantime must not adopt it.
#[derive(Default)]
pub struct ActionRuntime {
    adapters: BTreeMap<ActionKey, Box<dyn ErasedAdapter>>,
    requested: BTreeSet<ActionKey>,
    orphaned: BTreeMap<ActionKey, GoalHandle>,
}

impl ActionRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` under `key`, returning any adapter it replaces.
    pub fn register<P>(
        &mut self,
        key: ActionKey,
        adapter: AsyncActionAdapter<P>,
    ) -> Option<Box<dyn ErasedAdapter>>
    where
        P: ActionProvider,
    {
        self.adapters.insert(key, Box::new(adapter))
    }

    pub fn contains(&self, key: ActionKey) -> bool {
        self.adapters.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = ActionKey> + '_ {
        self.adapters.keys().copied()
    }

    pub fn state(&self, key: ActionKey) -> Option<AdapterState> {
        self.adapters.get(&key).map(|a| a.state())
    }

    pub fn is_active(&self, key: ActionKey) -> bool {
        self.state(key).is_some_and(AdapterState::is_active)
    }

    /// Typed read-only access. Does not count as a request.
    pub fn adapter<P>(&self, key: ActionKey) -> Option<&AsyncActionAdapter<P>>
    where
        P: ActionProvider,
    {
        self.adapters
            .get(&key)?
            .as_any()
            .downcast_ref::<AsyncActionAdapter<P>>()
    }

    /// Typed access for the owning action node; marks `key` as requested for
    /// the current tick. Returns `None` if nothing is registered under `key`
    /// or the registered adapter has a different provider type.
    pub fn request<P>(&mut self, key: ActionKey) -> Option<&mut AsyncActionAdapter<P>>
    where
        P: ActionProvider,
    {
        let adapter = self
            .adapters
            .get_mut(&key)?
            .as_any_mut()
            .downcast_mut::<AsyncActionAdapter<P>>()?;
        self.requested.insert(key);
        Some(adapter)
    }

    /// Ask the adapter under `key` to cancel its outstanding goal. Never
    /// polls the adapter; observing the outcome is the owner's job.
    pub fn cancel(&mut self, key: ActionKey) -> CancelOutcome {
        let Some(adapter) = self.adapters.get_mut(&key) else {
            return CancelOutcome::Unregistered;
        };
        match adapter.state() {
            AdapterState::Idle | AdapterState::Done => CancelOutcome::NotRunning,
            AdapterState::Canceling => CancelOutcome::AlreadyCanceling,
            AdapterState::Running => match adapter.cancel() {
                Ok(()) => {
                    tracing::info!(action = key.0, "action cancel requested");
                    CancelOutcome::Requested
                }
                Err(err) => {
                    tracing::error!(action = key.0, error = %err, "action cancel failed");
                    CancelOutcome::NotRunning
                }
            },
        }
    }

    /// Goal under `key` that was preempted because no node requested it and
    /// whose terminal result has not been drained yet.
    pub fn orphaned_goal(&self, key: ActionKey) -> Option<GoalHandle> {
        let orphan = *self.orphaned.get(&key)?;
        let current = self.adapters.get(&key)?.handle()?;
        (orphan == current).then_some(orphan)
    }

    pub fn begin_tick(&mut self) {
        self.requested.clear();
    }

    pub fn was_requested(&self, key: ActionKey) -> bool {
        self.requested.contains(&key)
    }

    pub fn preempt_unrequested(&mut self, ctx: &TickContext) {
        let requested = std::mem::take(&mut self.requested);

        for (key, adapter) in self.adapters.iter_mut() {
            if requested.contains(key) {
                continue;
            }

            if adapter.state() == AdapterState::Running {
                tracing::info!(action = key.0, tick = ctx.tick, "preempting unrequested action");
                if let Some(handle) = adapter.handle() {
                    self.orphaned.insert(*key, handle);
                }
                if let Err(err) = adapter.cancel() {
                    tracing::error!(action = key.0, error = %err, "preemption cancel failed");
                }
            }

            if adapter.state().is_active() {
                adapter.tick();
            }

            if adapter.state() == AdapterState::Done {
                self.orphaned.remove(key);
                match adapter.take_result() {
                    Ok(result) => tracing::debug!(
                        action = key.0,
                        status = ?result.status,
                        "discarding result of preempted action"
                    ),
                    Err(err) => {
                        tracing::error!(action = key.0, error = %err, "failed to discard result")
                    }
                }
            }
        }
    }
}

impl std::fmt::Debug for ActionRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.adapters.iter().map(|(k, a)| (k.0, a.state())))
            .finish()
    }
}

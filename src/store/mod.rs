//! Application state: the event log plus everything derived from it.
//!
//! All mutation goes through [`ExchangeState`], held behind one async lock.
//! Derived views are recomputed from the log on demand.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::compile::{DerivedViews, ViewCompiler};
use crate::domain::{AccountBalanceSnapshot, RawEvent};

pub mod events;
pub mod status;

pub use events::EventStore;
pub use status::{PendingFlags, StreamStatus, StreamStatuses};

/// Shared handle used by the orchestration tasks and the HTTP layer.
pub type SharedState = Arc<RwLock<ExchangeState>>;

#[derive(Debug, Default)]
pub struct ExchangeState {
    pub events: EventStore,
    pub statuses: StreamStatuses,
    pub pending: PendingFlags,
    pub balances: Option<AccountBalanceSnapshot>,
    balance_generation: u64,
    compiler: ViewCompiler,
}

impl ExchangeState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedState {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Apply a live delivery and clear any pending flag it settles.
    ///
    /// Returns `true` if the event was new.
    pub fn apply_live(&mut self, event: RawEvent) -> bool {
        let kind = event.kind();
        let inserted = self.events.apply(event);
        if inserted {
            self.pending.settle(kind);
        }
        inserted
    }

    /// Mark a balance re-fetch as started and return its generation.
    pub fn begin_balance_refresh(&mut self) -> u64 {
        self.balance_generation += 1;
        self.pending.balances_loading = true;
        self.balance_generation
    }

    /// Finish the re-fetch started as `generation`.
    ///
    /// Only the most recently started re-fetch may store its snapshot and
    /// clear `balances_loading`; an older one finishing late is dropped.
    /// A failed re-fetch (`None`) keeps the previous snapshot.
    pub fn finish_balance_refresh(
        &mut self,
        generation: u64,
        snapshot: Option<AccountBalanceSnapshot>,
    ) -> bool {
        if generation != self.balance_generation {
            return false;
        }
        self.pending.balances_loading = false;
        if let Some(snapshot) = snapshot {
            self.balances = Some(snapshot);
        }
        true
    }

    /// Current derived views, `None` until every order stream has loaded.
    pub fn views(&self) -> Option<Arc<DerivedViews>> {
        self.compiler.compile(&self.events, &self.statuses)
    }

    pub fn is_ready(&self) -> bool {
        self.statuses.all_loaded()
    }
}

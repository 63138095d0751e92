//! In-memory settlement source for tests and local runs.

use super::{BalanceScope, SettlementSource, SourceError};
use crate::domain::{Address, BaseUnits, Command, EventKind, EventLog};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Ledger {
    events: Vec<EventLog>,
    head: u64,
    balances: HashMap<(BalanceScope, Address, Address), BaseUnits>,
    failing_streams: HashSet<EventKind>,
    failing_head: bool,
    rejection: Option<String>,
    submitted: Vec<(Address, Command)>,
}

/// Mock settlement layer.
///
/// Cloning shares the ledger, so a test can keep a handle and push events
/// after the service has started polling.
#[derive(Debug, Clone, Default)]
pub struct MockSettlement {
    ledger: Arc<Mutex<Ledger>>,
}

impl MockSettlement {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> MutexGuard<'_, Ledger> {
        match self.ledger.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Add an event log; the head advances to its block.
    pub fn with_event(self, log: EventLog) -> Self {
        self.push_event(log);
        self
    }

    pub fn with_events(self, logs: impl IntoIterator<Item = EventLog>) -> Self {
        for log in logs {
            self.push_event(log);
        }
        self
    }

    /// Set a balance returned by `get_balance`.
    pub fn with_balance(
        self,
        scope: BalanceScope,
        token: &Address,
        account: &Address,
        amount: BaseUnits,
    ) -> Self {
        self.set_balance(scope, token, account, amount);
        self
    }

    /// Make queries of `kind` fail with a network error.
    pub fn failing_stream(self, kind: EventKind) -> Self {
        self.ledger().failing_streams.insert(kind);
        self
    }

    /// Make head-block reads fail with a network error.
    pub fn failing_head(self) -> Self {
        self.ledger().failing_head = true;
        self
    }

    /// Reject every submitted command with `reason`.
    pub fn rejecting_commands(self, reason: impl Into<String>) -> Self {
        self.ledger().rejection = Some(reason.into());
        self
    }

    /// Emit an event after construction.
    pub fn push_event(&self, log: EventLog) {
        let mut ledger = self.ledger();
        ledger.head = ledger.head.max(log.block_number);
        ledger.events.push(log);
    }

    pub fn set_balance(&self, scope: BalanceScope, token: &Address, account: &Address, amount: BaseUnits) {
        self.ledger()
            .balances
            .insert((scope, token.clone(), account.clone()), amount);
    }

    /// Commands accepted so far, with their sender.
    pub fn submitted(&self) -> Vec<(Address, Command)> {
        self.ledger().submitted.clone()
    }
}

#[async_trait]
impl SettlementSource for MockSettlement {
    async fn latest_block(&self) -> Result<u64, SourceError> {
        let ledger = self.ledger();
        if ledger.failing_head {
            return Err(SourceError::NetworkError("mock head unavailable".to_string()));
        }
        Ok(ledger.head)
    }

    async fn query_past_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>, SourceError> {
        let ledger = self.ledger();
        if ledger.failing_streams.contains(&kind) {
            return Err(SourceError::NetworkError(format!("{} stream unavailable", kind)));
        }
        Ok(ledger
            .events
            .iter()
            .filter(|log| {
                log.event == kind.as_str()
                    && log.block_number >= from_block
                    && log.block_number <= to_block
            })
            .cloned()
            .collect())
    }

    async fn get_balance(
        &self,
        scope: BalanceScope,
        token: &Address,
        account: &Address,
    ) -> Result<BaseUnits, SourceError> {
        Ok(self
            .ledger()
            .balances
            .get(&(scope, token.clone(), account.clone()))
            .copied()
            .unwrap_or_default())
    }

    async fn submit(&self, from: &Address, command: &Command) -> Result<String, SourceError> {
        let mut ledger = self.ledger();
        if let Some(reason) = &ledger.rejection {
            return Err(SourceError::Rejected(reason.clone()));
        }
        ledger.submitted.push((from.clone(), command.clone()));
        Ok(format!("0x{:064x}", ledger.submitted.len()))
    }
}

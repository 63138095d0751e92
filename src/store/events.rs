//! Append-only event collections with idempotent insertion.

use std::collections::HashSet;

use crate::compile::ViewVersion;
use crate::domain::{Address, BalanceEvent, EventKind, Order, OrderId, RawEvent};

/// In-memory event log.
///
/// Collections only grow. Each insert is keyed so a redelivered event (for
/// example one seen by both replay and a live subscription) is dropped.
#[derive(Debug, Default)]
pub struct EventStore {
    orders: Vec<Order>,
    cancels: Vec<Order>,
    trades: Vec<Order>,
    balance_events: Vec<BalanceEvent>,
    seen_orders: HashSet<(EventKind, OrderId)>,
    seen_balance_keys: HashSet<String>,
    version: ViewVersion,
    last_block: Option<u64>,
}

impl EventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one event idempotently.
    ///
    /// Returns `true` if the event was new.
    pub fn apply(&mut self, event: RawEvent) -> bool {
        let kind = event.kind();
        let block = event.block();
        let inserted = match event {
            RawEvent::OrderPlaced(order) => self.insert_order(kind, order),
            RawEvent::OrderCancelled(order) => self.insert_order(kind, order),
            RawEvent::TradeExecuted(order) => self.insert_order(kind, order),
            RawEvent::BalanceDeposited(event) | RawEvent::BalanceWithdrawn(event) => {
                if self.seen_balance_keys.insert(event.event_key.clone()) {
                    self.balance_events.push(event);
                    true
                } else {
                    false
                }
            }
        };
        if inserted {
            self.last_block = Some(self.last_block.map_or(block, |b| b.max(block)));
        }
        inserted
    }

    /// Insert a replayed batch; returns the number of new events.
    pub fn load_history(&mut self, events: impl IntoIterator<Item = RawEvent>) -> usize {
        let mut inserted = 0;
        for event in events {
            if self.apply(event) {
                inserted += 1;
            }
        }
        inserted
    }

    fn insert_order(&mut self, kind: EventKind, order: Order) -> bool {
        if !self.seen_orders.insert((kind, order.id)) {
            return false;
        }
        match kind {
            EventKind::Order => {
                self.orders.push(order);
                self.version.orders += 1;
            }
            EventKind::Cancel => {
                self.cancels.push(order);
                self.version.cancels += 1;
            }
            _ => {
                self.trades.push(order);
                self.version.trades += 1;
            }
        }
        true
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn cancels(&self) -> &[Order] {
        &self.cancels
    }

    pub fn trades(&self) -> &[Order] {
        &self.trades
    }

    pub fn version(&self) -> ViewVersion {
        self.version
    }

    /// Highest block of any applied event.
    pub fn last_block(&self) -> Option<u64> {
        self.last_block
    }

    /// Deposits and withdrawals by `account`, ascending by block.
    pub fn balance_events_for(&self, account: &Address) -> Vec<BalanceEvent> {
        let mut events: Vec<BalanceEvent> = self
            .balance_events
            .iter()
            .filter(|e| &e.user == account)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.block);
        events
    }
}

//! Load status per historical stream and pending-command flags.

use serde::Serialize;

use crate::domain::{EventKind, OrderType};

/// Load state of one historical stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "camelCase")]
pub enum StreamStatus {
    #[default]
    NotLoaded,
    Loaded,
    Failed(String),
}

impl StreamStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, StreamStatus::Loaded)
    }
}

/// Status of the Order, Cancel and Trade streams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamStatuses {
    pub orders: StreamStatus,
    pub cancels: StreamStatus,
    pub trades: StreamStatus,
}

impl StreamStatuses {
    /// Derived views exist only once every stream has loaded.
    pub fn all_loaded(&self) -> bool {
        self.orders.is_loaded() && self.cancels.is_loaded() && self.trades.is_loaded()
    }

    pub fn set(&mut self, kind: EventKind, status: StreamStatus) {
        match kind {
            EventKind::Order => self.orders = status,
            EventKind::Cancel => self.cancels = status,
            EventKind::Trade => self.trades = status,
            EventKind::Deposit | EventKind::Withdraw => {}
        }
    }

    pub fn mark_loaded(&mut self, kind: EventKind) {
        self.set(kind, StreamStatus::Loaded);
    }
}

/// Commands acknowledged by the settlement layer whose event has not arrived.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingFlags {
    pub order_cancelling: bool,
    pub order_filling: bool,
    pub buy_order_making: bool,
    pub sell_order_making: bool,
    pub balances_loading: bool,
}

impl PendingFlags {
    pub fn order_making(&mut self, side: OrderType) {
        match side {
            OrderType::Buy => self.buy_order_making = true,
            OrderType::Sell => self.sell_order_making = true,
        }
    }

    /// Clear the flags the arrival of a `kind` event settles.
    pub fn settle(&mut self, kind: EventKind) {
        match kind {
            EventKind::Order => {
                self.buy_order_making = false;
                self.sell_order_making = false;
            }
            EventKind::Cancel => self.order_cancelling = false,
            EventKind::Trade => self.order_filling = false,
            EventKind::Deposit | EventKind::Withdraw => {}
        }
    }
}

//! Settlement events: the raw log envelope and its normalized form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::{Address, BalanceEvent, BaseUnits, OrderId, TimeSec};

/// The five append-only streams emitted by the settlement contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    Order,
    Cancel,
    Trade,
    Deposit,
    Withdraw,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::Order,
        EventKind::Cancel,
        EventKind::Trade,
        EventKind::Deposit,
        EventKind::Withdraw,
    ];

    /// Streams replayed from genesis before the order book is considered loaded.
    pub const HISTORICAL: [EventKind; 3] = [EventKind::Cancel, EventKind::Trade, EventKind::Order];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Order => "Order",
            EventKind::Cancel => "Cancel",
            EventKind::Trade => "Trade",
            EventKind::Deposit => "Deposit",
            EventKind::Withdraw => "Withdraw",
        }
    }

    /// Whether a delivery on this stream changes account balances.
    pub fn moves_balances(&self) -> bool {
        matches!(
            self,
            EventKind::Trade | EventKind::Deposit | EventKind::Withdraw
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = NormalizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Order" => Ok(EventKind::Order),
            "Cancel" => Ok(EventKind::Cancel),
            "Trade" => Ok(EventKind::Trade),
            "Deposit" => Ok(EventKind::Deposit),
            "Withdraw" => Ok(EventKind::Withdraw),
            other => Err(NormalizeError::UnknownKind(other.to_string())),
        }
    }
}

/// A log entry as delivered by the settlement node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventLog {
    pub event: String,
    #[serde(deserialize_with = "block_number")]
    pub block_number: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<String>,
    pub return_values: Value,
}

fn block_number<'de, D: serde::Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    super::primitives::StrOrNum::deserialize(deserializer)?
        .into_u64()
        .map_err(serde::de::Error::custom)
}

impl EventLog {
    pub fn new(kind: EventKind, block_number: u64, return_values: Value) -> Self {
        Self {
            event: kind.as_str().to_string(),
            block_number,
            transaction_hash: None,
            return_values,
        }
    }

    pub fn with_transaction_hash(mut self, hash: impl Into<String>) -> Self {
        self.transaction_hash = Some(hash.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("unknown event kind {0:?}")]
    UnknownKind(String),
    #[error("malformed {kind} event at block {block}: {reason}")]
    Malformed {
        kind: EventKind,
        block: u64,
        reason: String,
    },
}

/// Canonical order record shared by the Order, Cancel and Trade streams.
///
/// `user_fill` is only present on Trade records. Fields the contract adds in
/// later versions are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: Address,
    pub token_get: Address,
    pub amount_get: BaseUnits,
    pub token_give: Address,
    pub amount_give: BaseUnits,
    pub timestamp: TimeSec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fill: Option<Address>,
    #[serde(default)]
    pub block: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Typed settlement event.
#[derive(Debug, Clone, PartialEq)]
pub enum RawEvent {
    OrderPlaced(Order),
    OrderCancelled(Order),
    TradeExecuted(Order),
    BalanceDeposited(BalanceEvent),
    BalanceWithdrawn(BalanceEvent),
}

impl RawEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::OrderPlaced(_) => EventKind::Order,
            RawEvent::OrderCancelled(_) => EventKind::Cancel,
            RawEvent::TradeExecuted(_) => EventKind::Trade,
            RawEvent::BalanceDeposited(_) => EventKind::Deposit,
            RawEvent::BalanceWithdrawn(_) => EventKind::Withdraw,
        }
    }

    pub fn block(&self) -> u64 {
        match self {
            RawEvent::OrderPlaced(o) | RawEvent::OrderCancelled(o) | RawEvent::TradeExecuted(o) => {
                o.block
            }
            RawEvent::BalanceDeposited(b) | RawEvent::BalanceWithdrawn(b) => b.block,
        }
    }
}

/// Map one log to its typed record. No filtering happens here.
///
/// # Errors
/// Fails on an unknown event name or a payload missing a required field.
pub fn normalize(log: EventLog) -> Result<RawEvent, NormalizeError> {
    let kind = EventKind::from_str(&log.event)?;
    let block = log.block_number;
    let tx_hash = log.transaction_hash;
    let malformed = |e: serde_json::Error| NormalizeError::Malformed {
        kind,
        block,
        reason: e.to_string(),
    };

    match kind {
        EventKind::Order | EventKind::Cancel | EventKind::Trade => {
            let mut order: Order = serde_json::from_value(log.return_values).map_err(malformed)?;
            order.block = block;
            order.tx_hash = tx_hash;
            // Positional duplicates ("0", "1", ...) carry nothing the named fields lack.
            order.extra.retain(|k, _| !k.chars().all(|c| c.is_ascii_digit()));
            match kind {
                EventKind::Order => {
                    order.user_fill = None;
                    Ok(RawEvent::OrderPlaced(order))
                }
                EventKind::Cancel => {
                    order.user_fill = None;
                    Ok(RawEvent::OrderCancelled(order))
                }
                _ => {
                    if order.user_fill.is_none() {
                        return Err(NormalizeError::Malformed {
                            kind,
                            block,
                            reason: "missing field `userFill`".to_string(),
                        });
                    }
                    Ok(RawEvent::TradeExecuted(order))
                }
            }
        }
        EventKind::Deposit | EventKind::Withdraw => {
            let fields: BalanceFields =
                serde_json::from_value(log.return_values).map_err(malformed)?;
            let event = BalanceEvent::new(
                kind,
                fields.token,
                fields.user,
                fields.amount,
                fields.balance,
                block,
                tx_hash,
            );
            if kind == EventKind::Deposit {
                Ok(RawEvent::BalanceDeposited(event))
            } else {
                Ok(RawEvent::BalanceWithdrawn(event))
            }
        }
    }
}

#[derive(Deserialize)]
struct BalanceFields {
    token: Address,
    user: Address,
    amount: BaseUnits,
    balance: BaseUnits,
}

//! Domain types for the token exchange event log.
//!
//! This module provides:
//! - Fixed-point base-unit amounts and the five-decimal display price
//! - Domain primitives: TimeSec, Address, OrderId, OrderType, PriceDirection
//! - Raw settlement events and their normalized records
//! - Balance events, balance snapshots and contract commands

pub mod amount;
pub mod balance;
pub mod command;
pub mod event;
pub mod ordering;
pub mod price;
pub mod primitives;

pub use amount::{format_balance, AmountError, BaseUnits};
pub use balance::{AccountBalanceSnapshot, BalanceEvent, FormattedBalances};
pub use command::Command;
pub use event::{normalize, EventKind, EventLog, NormalizeError, Order, RawEvent};
pub use ordering::{sort_ascending, sort_descending, Timestamped};
pub use price::Price;
pub use primitives::{
    Address, AddressParseError, OrderId, OrderType, PriceDirection, TimeSec, NATIVE_ASSET,
};

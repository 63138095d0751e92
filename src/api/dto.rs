use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::compile::ViewVersion;
use crate::domain::{Address, BalanceEvent, FormattedBalances, OrderType};
use crate::engine::{DecoratedOrder, IntegrityViolation};
use crate::orchestration::Asset;
use crate::store::{PendingFlags, StreamStatuses};

/// A view that only exists once the order streams have loaded.
#[derive(Debug, Serialize)]
pub struct Loadable<T> {
    pub loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Loadable<T> {
    pub fn loaded(data: T) -> Self {
        Self {
            loaded: true,
            data: Some(data),
        }
    }

    pub fn not_loaded() -> Self {
        Self {
            loaded: false,
            data: None,
        }
    }
}

impl<T> From<Option<T>> for Loadable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::not_loaded, Self::loaded)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub loaded: bool,
    pub streams: StreamStatuses,
    pub pending: PendingFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_block: Option<u64>,
    pub version: ViewVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Address>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenOrdersResponse {
    pub orders: Vec<DecoratedOrder>,
    pub violations: Vec<IntegrityViolation>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEventsResponse {
    pub account: Address,
    pub events: Vec<BalanceEvent>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub account: Address,
    pub loading: bool,
    #[serde(flatten)]
    pub formatted: FormattedBalances,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MakeOrderRequest {
    pub side: OrderType,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetParam {
    Native,
    Token,
}

impl From<AssetParam> for Asset {
    fn from(value: AssetParam) -> Self {
        match value {
            AssetParam::Native => Asset::Native,
            AssetParam::Token => Asset::Token,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub asset: AssetParam,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
}

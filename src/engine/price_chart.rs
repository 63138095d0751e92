//! Trade history and hourly OHLC price series.
//!
//! Hour buckets are aligned to UTC. The chart consumes trades oldest-first,
//! the history table newest-first; both orderings are produced here as
//! separate outputs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{sort_ascending, sort_descending, Order, Price, TimeSec};

use super::decorate::{decorate_filled_orders, decorate_order};
use super::DecoratedOrder;

const SECS_PER_HOUR: i64 = 3600;

/// Whether the last trade printed at or above the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PriceChange {
    #[serde(rename = "+")]
    Up,
    #[serde(rename = "-")]
    Down,
}

/// One hour of trading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candle {
    pub hour: DateTime<Utc>,
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
}

/// Chart points in the `{x, y: [o, h, l, c]}` shape charting libraries take.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlePoint {
    pub x: DateTime<Utc>,
    pub y: [Price; 4],
}

impl From<&Candle> for CandlePoint {
    fn from(candle: &Candle) -> Self {
        CandlePoint {
            x: candle.hour,
            y: [candle.open, candle.high, candle.low, candle.close],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    pub data: Vec<CandlePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceChart {
    pub last_price: Price,
    pub last_price_change: PriceChange,
    pub series: Vec<Series>,
    #[serde(skip)]
    pub candles: Vec<Candle>,
}

/// Start of the UTC hour containing `timestamp`.
pub fn hour_bucket(timestamp: TimeSec) -> TimeSec {
    TimeSec::new(timestamp.as_secs().div_euclid(SECS_PER_HOUR) * SECS_PER_HOUR)
}

/// Build the price chart from filled orders in any order.
pub fn build_price_chart(filled: &[Order]) -> PriceChart {
    let mut trades = filled.to_vec();
    sort_ascending(&mut trades);
    let decorated: Vec<DecoratedOrder> = trades.iter().map(decorate_order).collect();

    let (second_last, last) = match decorated.as_slice() {
        [] => (None, None),
        [only] => (None, Some(only)),
        [.., a, b] => (Some(a), Some(b)),
    };
    let last_price = last.map(|o| o.token_price).unwrap_or_else(Price::zero);
    let second_last_price = second_last.map(|o| o.token_price).unwrap_or_else(Price::zero);
    let last_price_change = if last_price >= second_last_price {
        PriceChange::Up
    } else {
        PriceChange::Down
    };

    let candles = build_candles(&decorated);
    PriceChart {
        last_price,
        last_price_change,
        series: vec![Series {
            data: candles.iter().map(CandlePoint::from).collect(),
        }],
        candles,
    }
}

/// OHLC per non-empty hour, ascending. Input must be oldest-first.
pub fn build_candles(trades: &[DecoratedOrder]) -> Vec<Candle> {
    let mut buckets: BTreeMap<TimeSec, Vec<Price>> = BTreeMap::new();
    for trade in trades {
        buckets
            .entry(hour_bucket(trade.order.timestamp))
            .or_default()
            .push(trade.token_price);
    }

    buckets
        .into_iter()
        .filter_map(|(hour, prices)| {
            let open = *prices.first()?;
            let close = *prices.last()?;
            let high = *prices.iter().max()?;
            let low = *prices.iter().min()?;
            Some(Candle {
                hour: hour.to_utc(),
                open,
                high,
                low,
                close,
            })
        })
        .collect()
}

/// Filled orders with price direction tags, newest first.
pub fn build_trade_history(filled: &[Order]) -> Vec<DecoratedOrder> {
    let mut trades = filled.to_vec();
    sort_ascending(&mut trades);
    let mut decorated = decorate_filled_orders(&trades);
    sort_descending(&mut decorated);
    decorated
}

//! Pure derivation of the exchange views from the order streams.

use serde::{Serialize, Serializer};

use crate::domain::{BaseUnits, Order, OrderType, Price, PriceDirection};

pub mod account;
pub mod decorate;
pub mod open_orders;
pub mod order_book;
pub mod price_chart;

pub use account::{my_open_orders, my_trade_history};
pub use decorate::{classify, decorate_filled_order, decorate_filled_orders, decorate_order};
pub use open_orders::{compute_open_orders, IntegrityViolation, OpenOrderSet};
pub use order_book::{build_order_book, OrderBook};
pub use price_chart::{build_price_chart, build_trade_history, Candle, PriceChange, PriceChart};

/// An order with its display fields attached.
///
/// Serializes the raw order fields alongside the display ones; the two legs
/// are rendered in display units.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoratedOrder {
    pub order: Order,
    /// Native leg in base units.
    pub ether_amount: BaseUnits,
    /// Token leg in base units.
    pub token_amount: BaseUnits,
    pub token_price: Price,
    pub order_type: OrderType,
    pub formatted_timestamp: String,
    /// Side a counterparty submits to fill this order (order book only).
    pub order_fill_action: Option<OrderType>,
    /// Set on trades only.
    pub price_direction: Option<PriceDirection>,
    /// Set on the per-account trade view only.
    pub order_sign: Option<char>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DecoratedOrderWire<'a> {
    #[serde(flatten)]
    order: &'a Order,
    ether_amount: String,
    token_amount: String,
    token_price: Price,
    order_type: OrderType,
    order_type_class: &'static str,
    formatted_timestamp: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_fill_action: Option<OrderType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_direction: Option<PriceDirection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_price_class: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_sign: Option<char>,
}

impl Serialize for DecoratedOrder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        DecoratedOrderWire {
            order: &self.order,
            ether_amount: self.ether_amount.to_decimal_string(),
            token_amount: self.token_amount.to_decimal_string(),
            token_price: self.token_price,
            order_type: self.order_type,
            order_type_class: self.order_type.css_class(),
            formatted_timestamp: &self.formatted_timestamp,
            order_fill_action: self.order_fill_action,
            price_direction: self.price_direction,
            token_price_class: self.price_direction.map(|d| d.css_class()),
            order_sign: self.order_sign,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::str::FromStr;

    use crate::domain::{Address, BaseUnits, Order, OrderId, TimeSec};

    pub const TOKEN: &str = "0x3333333333333333333333333333333333333333";

    fn units(s: &str) -> BaseUnits {
        BaseUnits::from_decimal_str(s).unwrap()
    }

    fn order(id: u64, user: &str, get: (Address, &str), give: (Address, &str), ts: i64) -> Order {
        Order {
            id: OrderId::new(id),
            user: Address::from_str(user).unwrap(),
            token_get: get.0,
            amount_get: units(get.1),
            token_give: give.0,
            amount_give: units(give.1),
            timestamp: TimeSec::new(ts),
            user_fill: None,
            block: 0,
            tx_hash: None,
            extra: Default::default(),
        }
    }

    /// Maker gives `ether` native units for `tokens` tokens.
    pub fn buy(id: u64, user: &str, ether: &str, tokens: &str, ts: i64) -> Order {
        let token = Address::from_str(TOKEN).unwrap();
        order(id, user, (token, tokens), (Address::native(), ether), ts)
    }

    /// Maker gives `tokens` tokens for `ether` native units.
    pub fn sell(id: u64, user: &str, ether: &str, tokens: &str, ts: i64) -> Order {
        let token = Address::from_str(TOKEN).unwrap();
        order(id, user, (Address::native(), ether), (token, tokens), ts)
    }

    pub fn trade_of(placed: &Order, filler: &str, ts: i64) -> Order {
        Order {
            user_fill: Some(Address::from_str(filler).unwrap()),
            timestamp: TimeSec::new(ts),
            ..placed.clone()
        }
    }

    pub fn cancel_of(placed: &Order) -> Order {
        placed.clone()
    }
}

//! Order classification and display decoration.

use crate::domain::{BaseUnits, Order, OrderType, Price, PriceDirection, TimeSec, Timestamped};

use super::DecoratedOrder;

/// `buy` iff the maker gives the native asset.
pub fn classify(order: &Order) -> OrderType {
    if order.token_give.is_native() {
        OrderType::Buy
    } else {
        OrderType::Sell
    }
}

/// Split an order into its (native leg, token leg).
pub fn legs(order: &Order) -> (BaseUnits, BaseUnits) {
    if order.token_give.is_native() {
        (order.amount_give, order.amount_get)
    } else {
        (order.amount_get, order.amount_give)
    }
}

/// `h:mm:ss a M/D` in UTC, e.g. `3:04:05 pm 1/2`.
pub fn format_timestamp(timestamp: TimeSec) -> String {
    timestamp.to_utc().format("%-I:%M:%S %P %-m/%-d").to_string()
}

/// Attach amounts, price, side and formatted time to an order.
pub fn decorate_order(order: &Order) -> DecoratedOrder {
    let (ether_amount, token_amount) = legs(order);
    DecoratedOrder {
        order: order.clone(),
        ether_amount,
        token_amount,
        token_price: Price::from_amounts(&ether_amount, &token_amount),
        order_type: classify(order),
        formatted_timestamp: format_timestamp(order.timestamp),
        order_fill_action: None,
        price_direction: None,
        order_sign: None,
    }
}

/// Tag a trade `up` or `down` against the trade before it.
///
/// The first trade of a sequence is passed itself as `previous` and is
/// always `up`.
pub fn decorate_filled_order(mut order: DecoratedOrder, previous: &DecoratedOrder) -> DecoratedOrder {
    let direction = if previous.order.id == order.order.id
        || previous.token_price <= order.token_price
    {
        PriceDirection::Up
    } else {
        PriceDirection::Down
    };
    order.price_direction = Some(direction);
    order
}

/// Decorate chronologically ascending trades, carrying the previous trade
/// forward as fold state.
pub fn decorate_filled_orders(trades: &[Order]) -> Vec<DecoratedOrder> {
    let mut out: Vec<DecoratedOrder> = Vec::with_capacity(trades.len());
    for trade in trades {
        let decorated = decorate_order(trade);
        let tagged = match out.last() {
            Some(previous) => decorate_filled_order(decorated, previous),
            None => {
                let first = decorated.clone();
                decorate_filled_order(decorated, &first)
            }
        };
        out.push(tagged);
    }
    out
}

impl Timestamped for DecoratedOrder {
    fn timestamp(&self) -> TimeSec {
        self.order.timestamp
    }
}

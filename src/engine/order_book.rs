//! Order book: open orders split by side and ranked by price.

use serde::Serialize;

use crate::domain::{Order, OrderType};

use super::decorate::decorate_order;
use super::DecoratedOrder;

/// Open orders split by side, each side sorted by price descending.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBook {
    pub buy_orders: Vec<DecoratedOrder>,
    pub sell_orders: Vec<DecoratedOrder>,
}

impl OrderBook {
    pub fn len(&self) -> usize {
        self.buy_orders.len() + self.sell_orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Build the book from the open set.
///
/// Equal prices keep their input order.
pub fn build_order_book(open_orders: &[Order]) -> OrderBook {
    let mut book = OrderBook::default();
    for order in open_orders {
        let mut decorated = decorate_order(order);
        decorated.order_fill_action = Some(decorated.order_type.opposite());
        match decorated.order_type {
            OrderType::Buy => book.buy_orders.push(decorated),
            OrderType::Sell => book.sell_orders.push(decorated),
        }
    }
    sort_by_price_descending(&mut book.buy_orders);
    sort_by_price_descending(&mut book.sell_orders);
    book
}

pub fn sort_by_price_descending(orders: &mut [DecoratedOrder]) {
    orders.sort_by(|a, b| b.token_price.cmp(&a.token_price));
}

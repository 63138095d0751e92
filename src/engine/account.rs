//! Views of the open orders and trades belonging to one account.

use crate::domain::{sort_ascending, sort_descending, Address, Order};

use super::decorate::decorate_order;
use super::DecoratedOrder;

/// Open orders placed by `account`, newest first.
///
/// No fill action is attached: the viewer cannot fill their own order.
pub fn my_open_orders(account: &Address, open_orders: &[Order]) -> Vec<DecoratedOrder> {
    let mut mine: Vec<Order> = open_orders
        .iter()
        .filter(|o| &o.user == account)
        .cloned()
        .collect();
    sort_descending(&mut mine);
    mine.iter().map(decorate_order).collect()
}

/// Trades `account` took part in as maker or filler, oldest first.
///
/// The side is relative to the viewer: a filler sees the mirror of the
/// maker's side. `order_sign` is `+` for a relative buy.
pub fn my_trade_history(account: &Address, filled_orders: &[Order]) -> Vec<DecoratedOrder> {
    let mut mine: Vec<Order> = filled_orders
        .iter()
        .filter(|o| &o.user == account || o.user_fill.as_ref() == Some(account))
        .cloned()
        .collect();
    sort_ascending(&mut mine);
    mine.iter()
        .map(|order| {
            let mut decorated = decorate_order(order);
            if &order.user != account {
                decorated.order_type = decorated.order_type.opposite();
            }
            decorated.order_sign = Some(decorated.order_type.sign());
            decorated
        })
        .collect()
}

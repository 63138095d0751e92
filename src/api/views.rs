//! Market-wide views: order book, trade history, price chart and open orders.

use axum::extract::State;
use axum::Json;

use crate::engine::{decorate_order, DecoratedOrder, OrderBook, PriceChart};

use super::dto::{Loadable, OpenOrdersResponse};
use super::AppState;

pub async fn get_order_book(State(state): State<AppState>) -> Json<Loadable<OrderBook>> {
    let views = state.exchange.read().await.views();
    Json(views.map(|v| v.order_book.clone()).into())
}

/// Filled orders, newest first, tagged with price direction.
pub async fn get_trades(State(state): State<AppState>) -> Json<Loadable<Vec<DecoratedOrder>>> {
    let views = state.exchange.read().await.views();
    Json(views.map(|v| v.trade_history.clone()).into())
}

pub async fn get_price_chart(State(state): State<AppState>) -> Json<Loadable<PriceChart>> {
    let views = state.exchange.read().await.views();
    Json(views.map(|v| v.price_chart.clone()).into())
}

pub async fn get_open_orders(
    State(state): State<AppState>,
) -> Json<Loadable<OpenOrdersResponse>> {
    let views = state.exchange.read().await.views();
    Json(
        views
            .map(|v| OpenOrdersResponse {
                orders: v.open_orders.orders.iter().map(decorate_order).collect(),
                violations: v.open_orders.violations.clone(),
            })
            .into(),
    )
}

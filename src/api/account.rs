//! Per-account views and the session balance snapshot.

use axum::extract::{Path, State};
use axum::Json;

use crate::domain::{format_balance, FormattedBalances};
use crate::engine::{my_open_orders, my_trade_history, DecoratedOrder};
use crate::error::AppError;

use super::dto::{BalanceEventsResponse, BalancesResponse, Loadable};
use super::{parse_account, AppState};

pub async fn get_my_open_orders(
    Path(account): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Loadable<Vec<DecoratedOrder>>>, AppError> {
    let account = parse_account(&account)?;
    let views = state.exchange.read().await.views();
    Ok(Json(
        views
            .map(|v| my_open_orders(&account, &v.open_orders.orders))
            .into(),
    ))
}

/// Trades the account made or filled, oldest first, side relative to the account.
pub async fn get_my_trades(
    Path(account): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Loadable<Vec<DecoratedOrder>>>, AppError> {
    let account = parse_account(&account)?;
    let views = state.exchange.read().await.views();
    Ok(Json(views.map(|v| my_trade_history(&account, &v.filled)).into()))
}

pub async fn get_my_balance_events(
    Path(account): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<BalanceEventsResponse>, AppError> {
    let account = parse_account(&account)?;
    let events = state.exchange.read().await.events.balance_events_for(&account);
    Ok(Json(BalanceEventsResponse { account, events }))
}

/// Balances of the session account, formatted for display.
///
/// Every figure reads `0` until the first fetch completes.
pub async fn get_balances(
    State(state): State<AppState>,
) -> Result<Json<BalancesResponse>, AppError> {
    let account = state
        .commands
        .account()
        .cloned()
        .ok_or_else(|| AppError::NotFound("no session account configured".to_string()))?;
    let decimals = state.config.display_decimals;
    let exchange = state.exchange.read().await;

    let (formatted, fetched_at) = match exchange.balances.as_ref().filter(|b| b.account == account) {
        Some(snapshot) => (snapshot.formatted(decimals), Some(snapshot.fetched_at)),
        None => (
            FormattedBalances {
                wallet_native: format_balance(None, decimals),
                wallet_token: format_balance(None, decimals),
                exchange_native: format_balance(None, decimals),
                exchange_token: format_balance(None, decimals),
            },
            None,
        ),
    };

    Ok(Json(BalancesResponse {
        account,
        loading: exchange.pending.balances_loading,
        formatted,
        fetched_at,
    }))
}

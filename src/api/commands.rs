//! Command endpoints. Each returns once the settlement layer acknowledges.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::domain::{OrderId, OrderType};
use crate::error::AppError;
use crate::orchestration::Submitted;

use super::dto::{MakeOrderRequest, TransferRequest};
use super::AppState;

type Accepted = (StatusCode, Json<Submitted>);

fn accepted(submitted: Submitted) -> Accepted {
    (StatusCode::ACCEPTED, Json(submitted))
}

pub async fn make_order(
    State(state): State<AppState>,
    Json(req): Json<MakeOrderRequest>,
) -> Result<Accepted, AppError> {
    let submitted = match req.side {
        OrderType::Buy => state.commands.make_buy_order(req.amount, req.price).await?,
        OrderType::Sell => state.commands.make_sell_order(req.amount, req.price).await?,
    };
    Ok(accepted(submitted))
}

pub async fn cancel_order(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Accepted, AppError> {
    let submitted = state.commands.cancel_order(OrderId::new(id)).await?;
    Ok(accepted(submitted))
}

pub async fn fill_order(
    Path(id): Path<u64>,
    State(state): State<AppState>,
) -> Result<Accepted, AppError> {
    let submitted = state.commands.fill_order(OrderId::new(id)).await?;
    Ok(accepted(submitted))
}

pub async fn deposit(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Accepted, AppError> {
    let submitted = state.commands.deposit(req.asset.into(), req.amount).await?;
    Ok(accepted(submitted))
}

pub async fn withdraw(
    State(state): State<AppState>,
    Json(req): Json<TransferRequest>,
) -> Result<Accepted, AppError> {
    let submitted = state.commands.withdraw(req.asset.into(), req.amount).await?;
    Ok(accepted(submitted))
}

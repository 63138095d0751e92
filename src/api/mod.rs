pub mod account;
pub mod commands;
pub mod dto;
pub mod health;
pub mod views;

use crate::config::Config;
use crate::domain::Address;
use crate::error::AppError;
use crate::orchestration::CommandService;
use crate::store::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use std::str::FromStr;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub exchange: SharedState,
    pub config: Config,
    pub commands: CommandService,
}

impl AppState {
    pub fn new(exchange: SharedState, config: Config, commands: CommandService) -> Self {
        Self {
            exchange,
            config,
            commands,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/status", get(health::status))
        .route("/v1/order-book", get(views::get_order_book))
        .route("/v1/trades", get(views::get_trades))
        .route("/v1/price-chart", get(views::get_price_chart))
        .route("/v1/open-orders", get(views::get_open_orders))
        .route(
            "/v1/accounts/:account/open-orders",
            get(account::get_my_open_orders),
        )
        .route("/v1/accounts/:account/trades", get(account::get_my_trades))
        .route(
            "/v1/accounts/:account/balance-events",
            get(account::get_my_balance_events),
        )
        .route("/v1/balances", get(account::get_balances))
        .route("/v1/orders", post(commands::make_order))
        .route("/v1/orders/:id/cancel", post(commands::cancel_order))
        .route("/v1/orders/:id/fill", post(commands::fill_order))
        .route("/v1/deposits", post(commands::deposit))
        .route("/v1/withdrawals", post(commands::withdraw))
        .layer(cors)
        .with_state(state)
}

fn parse_account(raw: &str) -> Result<Address, AppError> {
    Address::from_str(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

use axum::http::StatusCode;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tokenbook::api;
use tokenbook::config::Config;
use tokenbook::datasource::{BalanceScope, MockSettlement};
use tokenbook::domain::{Address, BaseUnits, Command, OrderId};
use tokenbook::orchestration::{BalanceRefresher, CommandService};
use tokenbook::store::{ExchangeState, SharedState};
use tower::util::ServiceExt;

const ACCOUNT: &str = "0x1111111111111111111111111111111111111111";
const TOKEN: &str = "0x3333333333333333333333333333333333333333";

fn config(account: Option<&str>) -> Config {
    let mut env = HashMap::new();
    env.insert("SETTLEMENT_URL".to_string(), "http://example.invalid".to_string());
    env.insert("TOKEN_ADDRESS".to_string(), TOKEN.to_string());
    env.insert("DISPLAY_DECIMALS".to_string(), "3".to_string());
    if let Some(account) = account {
        env.insert("ACCOUNT".to_string(), account.to_string());
    }
    Config::from_env_map(env).unwrap()
}

fn app(source: &MockSettlement, exchange: SharedState, account: Option<&str>) -> axum::Router {
    let config = config(account);
    let commands = CommandService::new(
        Arc::new(source.clone()),
        exchange.clone(),
        config.account.clone(),
        config.token_address.clone(),
    );
    api::create_router(api::AppState::new(exchange, config, commands))
}

async fn send(app: axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = axum::http::Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(axum::body::Body::empty()).unwrap(),
    };

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_sell_order_is_submitted() {
    let source = MockSettlement::new();
    let exchange = ExchangeState::shared();
    let router = app(&source, exchange.clone(), Some(ACCOUNT));

    let (status, body) = send(
        router,
        "POST",
        "/v1/orders",
        Some(json!({"side": "sell", "amount": "4", "price": "0.25"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["transactionHash"].as_str().unwrap().starts_with("0x"));
    assert!(body["requestId"].is_string());
    assert_eq!(body["command"]["type"], "makeOrder");
    assert_eq!(body["command"]["amountGet"], "1000000000000000000");
    assert_eq!(body["command"]["amountGive"], "4000000000000000000");

    let sent = source.submitted();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0.as_str(), ACCOUNT);
    assert!(exchange.read().await.pending.sell_order_making);
}

#[tokio::test]
async fn test_cancel_and_fill() {
    let source = MockSettlement::new();
    let exchange = ExchangeState::shared();
    let router = app(&source, exchange.clone(), Some(ACCOUNT));

    let (status, _) = send(router.clone(), "POST", "/v1/orders/7/cancel", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let (status, _) = send(router, "POST", "/v1/orders/8/fill", None).await;
    assert_eq!(status, StatusCode::ACCEPTED);

    let commands: Vec<Command> = source.submitted().into_iter().map(|(_, c)| c).collect();
    assert_eq!(
        commands,
        vec![
            Command::CancelOrder { id: OrderId::new(7) },
            Command::FillOrder { id: OrderId::new(8) },
        ]
    );
    let pending = exchange.read().await.pending;
    assert!(pending.order_cancelling);
    assert!(pending.order_filling);
}

#[tokio::test]
async fn test_token_deposit_and_native_withdrawal() {
    let source = MockSettlement::new();
    let router = app(&source, ExchangeState::shared(), Some(ACCOUNT));

    let (status, body) = send(
        router.clone(),
        "POST",
        "/v1/deposits",
        Some(json!({"asset": "token", "amount": "2"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["command"]["type"], "depositToken");

    let (status, body) = send(
        router,
        "POST",
        "/v1/withdrawals",
        Some(json!({"asset": "native", "amount": "0.5"})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["command"]["type"], "withdrawNative");

    let names: Vec<&str> = source.submitted().iter().map(|(_, c)| c.name()).collect();
    assert_eq!(names, vec!["approveToken", "depositToken", "withdrawNative"]);
}

#[tokio::test]
async fn test_rejected_command_is_unprocessable() {
    let source = MockSettlement::new().rejecting_commands("insufficient balance");
    let exchange = ExchangeState::shared();
    let router = app(&source, exchange.clone(), Some(ACCOUNT));

    let (status, body) = send(
        router,
        "POST",
        "/v1/orders",
        Some(json!({"side": "buy", "amount": "1", "price": "1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "insufficient balance");
    assert!(!exchange.read().await.pending.buy_order_making);
}

#[tokio::test]
async fn test_commands_need_an_account() {
    let source = MockSettlement::new();
    let router = app(&source, ExchangeState::shared(), None);

    let (status, body) = send(router.clone(), "POST", "/v1/orders/1/cancel", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("account"));

    let (status, _) = send(router, "GET", "/v1/balances", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(source.submitted().is_empty());
}

#[tokio::test]
async fn test_invalid_amount_is_bad_request() {
    let source = MockSettlement::new();
    let router = app(&source, ExchangeState::shared(), Some(ACCOUNT));
    let (status, _) = send(
        router,
        "POST",
        "/v1/deposits",
        Some(json!({"asset": "native", "amount": "0.0000000000000000001"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(source.submitted().is_empty());
}

#[tokio::test]
async fn test_balances_before_and_after_refresh() {
    let account = Address::from_str(ACCOUNT).unwrap();
    let token = Address::from_str(TOKEN).unwrap();
    let source = MockSettlement::new()
        .with_balance(
            BalanceScope::Wallet,
            &Address::native(),
            &account,
            BaseUnits::from_decimal_str("1.23456").unwrap(),
        )
        .with_balance(
            BalanceScope::Exchange,
            &token,
            &account,
            BaseUnits::from_decimal_str("100").unwrap(),
        );
    let exchange = ExchangeState::shared();
    let router = app(&source, exchange.clone(), Some(ACCOUNT));

    let (status, body) = send(router.clone(), "GET", "/v1/balances", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["walletNative"], "0");
    assert!(body.get("fetchedAt").is_none());

    BalanceRefresher::new(Arc::new(source), exchange, account, token)
        .refresh()
        .await
        .unwrap();

    let (_, body) = send(router, "GET", "/v1/balances", None).await;
    assert_eq!(body["account"], ACCOUNT);
    assert_eq!(body["walletNative"], "1.234");
    assert_eq!(body["walletToken"], "0.000");
    assert_eq!(body["exchangeToken"], "100.000");
    assert_eq!(body["loading"], false);
    assert!(body["fetchedAt"].is_string());
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::dto::StatusResponse;
use super::AppState;

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Ready once every order stream has replayed.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    if state.exchange.read().await.is_ready() {
        (StatusCode::OK, Json(serde_json::json!({"status": "ready"})))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "loading"})),
        )
    }
}

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    let exchange = state.exchange.read().await;
    Json(StatusResponse {
        loaded: exchange.is_ready(),
        streams: exchange.statuses.clone(),
        pending: exchange.pending,
        last_block: exchange.events.last_block(),
        version: exchange.events.version(),
        account: state.commands.account().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_returns_ok() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
    }
}

use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tokenbook::datasource::GatewaySettlement;
use tokenbook::orchestration::{CommandService, Session};
use tokenbook::store::ExchangeState;
use tokenbook::{api, config::Config, SettlementSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("Configuration error")?;
    let port = config.port;

    let source: Arc<dyn SettlementSource> =
        Arc::new(GatewaySettlement::new(config.settlement_url.clone()));
    let exchange = ExchangeState::shared();

    // Served while history replays; /ready reports 503 until it has loaded.
    let session = Session::spawn(config.clone(), Arc::clone(&source), exchange.clone());

    let commands = CommandService::new(
        source,
        exchange.clone(),
        config.account.clone(),
        config.token_address.clone(),
    );
    let app = api::create_router(api::AppState::new(exchange, config, commands));

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    if session.is_finished() {
        if let Ok(Some(session)) = session.await {
            session.shutdown().await;
        }
    } else {
        session.abort();
    }
    Ok(())
}

//! Replay, live delivery, balance re-fetch and command submission.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::datasource::SettlementSource;
use crate::domain::EventKind;
use crate::store::SharedState;

pub mod balances;
pub mod commands;
pub mod live;
pub mod replay;

pub use balances::BalanceRefresher;
pub use commands::{Asset, CommandError, CommandService, Submitted};
pub use live::{run_apply_loop, subscribe, Delivery};
pub use replay::{replay_history, ReplayError, ReplaySummary};

const DELIVERY_BUFFER: usize = 256;

/// A running session: replayed history plus the live tasks that follow it.
#[derive(Debug)]
pub struct Session {
    pub replay: ReplaySummary,
    subscriptions: Vec<JoinHandle<()>>,
    apply_loop: JoinHandle<()>,
    shutdown: watch::Sender<bool>,
}

impl Session {
    /// Replay history, then subscribe to every stream from the block after.
    ///
    /// Streams that failed to replay stay `Failed`; live delivery still runs
    /// so deposits and withdrawals keep flowing.
    pub async fn start(
        config: &Config,
        source: Arc<dyn SettlementSource>,
        state: SharedState,
    ) -> Result<Self, ReplayError> {
        let replay = replay_history(source.as_ref(), &state, config.from_block).await?;
        if !replay.failed.is_empty() {
            warn!("Replay incomplete, failed streams: {:?}", replay.failed);
        }

        let balances = config.account.clone().map(|account| {
            BalanceRefresher::new(
                Arc::clone(&source),
                state.clone(),
                account,
                config.token_address.clone(),
            )
        });
        if let Some(refresher) = &balances {
            refresher.spawn_refresh();
        }

        let (tx, rx) = mpsc::channel(DELIVERY_BUFFER);
        let (shutdown, shutdown_rx) = watch::channel(false);
        let from_block = config.from_block.max(replay.to_block + 1);
        let subscriptions = EventKind::ALL
            .into_iter()
            .map(|kind| {
                subscribe(
                    Arc::clone(&source),
                    kind,
                    from_block,
                    config.poll_interval(),
                    tx.clone(),
                )
            })
            .collect();
        let apply_loop = tokio::spawn(run_apply_loop(state, rx, balances, shutdown_rx));

        info!(
            "Session started at block {}, following from block {}",
            replay.to_block, from_block
        );
        Ok(Self {
            replay,
            subscriptions,
            apply_loop,
            shutdown,
        })
    }

    /// Run `start` in the background so the HTTP surface can come up first.
    ///
    /// If the head block cannot be read the replay streams are left `Failed`,
    /// no subscriptions start and the task yields `None`. Restarting the
    /// process is the full reload.
    pub fn spawn(
        config: Config,
        source: Arc<dyn SettlementSource>,
        state: SharedState,
    ) -> JoinHandle<Option<Self>> {
        tokio::spawn(async move {
            match Self::start(&config, source, state).await {
                Ok(session) => Some(session),
                Err(e) => {
                    error!("Session not started: {}", e);
                    None
                }
            }
        })
    }

    /// Stop the subscriptions and the apply loop.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        for handle in &self.subscriptions {
            handle.abort();
        }
        if let Err(e) = self.apply_loop.await {
            warn!("Apply loop ended abnormally: {}", e);
        }
    }
}

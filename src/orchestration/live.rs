//! Live delivery: one polling subscription per stream feeding a single apply loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::datasource::SettlementSource;
use crate::domain::{normalize, EventKind, EventLog};
use crate::store::SharedState;

use super::balances::BalanceRefresher;

/// A log tagged with the stream it was delivered on.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub kind: EventKind,
    pub log: EventLog,
}

/// Poll `kind` from `from_block` onward and forward every log to `tx`.
///
/// A failed poll is logged and retried on the next tick; the logs it would
/// have delivered are picked up then because the cursor does not advance.
/// The task ends when the receiver is dropped.
pub fn subscribe(
    source: Arc<dyn SettlementSource>,
    kind: EventKind,
    from_block: u64,
    interval: Duration,
    tx: mpsc::Sender<Delivery>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Subscribed to {} events from block {}", kind, from_block);
        let mut cursor = from_block;
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            if tx.is_closed() {
                return;
            }

            let head = match source.latest_block().await {
                Ok(head) => head,
                Err(e) => {
                    warn!("{} subscription: head read failed: {}", kind, e);
                    continue;
                }
            };
            if head < cursor {
                continue;
            }

            let logs = match source.query_past_events(kind, cursor, head).await {
                Ok(logs) => logs,
                Err(e) => {
                    warn!("{} subscription: missed signal: {}", kind, e);
                    continue;
                }
            };
            for log in logs {
                if tx.send(Delivery { kind, log }).await.is_err() {
                    return;
                }
            }
            cursor = head + 1;
        }
    })
}

/// Apply deliveries one at a time until shutdown or all senders close.
///
/// A new Trade, Deposit or Withdraw triggers a balance re-fetch as an
/// independent task.
pub async fn run_apply_loop(
    state: SharedState,
    mut rx: mpsc::Receiver<Delivery>,
    balances: Option<BalanceRefresher>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            delivery = rx.recv() => {
                let Some(Delivery { kind, log }) = delivery else {
                    debug!("All subscriptions closed");
                    return;
                };
                let event = match normalize(log) {
                    Ok(event) if event.kind() == kind => event,
                    Ok(event) => {
                        warn!("Dropping {} event delivered on the {} stream", event.kind(), kind);
                        continue;
                    }
                    Err(e) => {
                        warn!("Dropping malformed live {} log: {}", kind, e);
                        continue;
                    }
                };

                let block = event.block();
                let inserted = state.write().await.apply_live(event);
                if !inserted {
                    debug!("Duplicate {} event at block {} ignored", kind, block);
                    continue;
                }
                debug!("Applied {} event at block {}", kind, block);

                if kind.moves_balances() {
                    if let Some(refresher) = &balances {
                        refresher.spawn_refresh();
                    }
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    info!("Apply loop stopped");
                    return;
                }
            }
        }
    }
}

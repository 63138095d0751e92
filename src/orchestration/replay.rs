//! Historical replay of the order streams.

use std::collections::BTreeMap;

use futures::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::datasource::{SettlementSource, SourceError};
use crate::domain::{normalize, EventKind, EventLog, RawEvent};
use crate::store::{SharedState, StreamStatus};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read head block: {0}")]
    Head(#[from] SourceError),
}

/// Outcome of one replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    /// Last block covered; live delivery continues from the block after.
    pub to_block: u64,
    /// New events committed per stream.
    pub inserted: BTreeMap<EventKind, usize>,
    /// Streams whose query failed.
    pub failed: Vec<EventKind>,
}

/// Normalize a batch of logs, skipping any that fail with a warning.
pub fn normalize_logs(kind: EventKind, logs: Vec<EventLog>) -> Vec<RawEvent> {
    let mut events = Vec::with_capacity(logs.len());
    for log in logs {
        match normalize(log) {
            Ok(event) if event.kind() == kind => events.push(event),
            Ok(event) => warn!(
                expected = %kind,
                got = %event.kind(),
                "Skipping event delivered on the wrong stream"
            ),
            Err(e) => warn!("Skipping malformed {} log: {}", kind, e),
        }
    }
    events
}

/// Query the Cancel, Trade and Order streams from `from_block` to the head.
///
/// The three queries run concurrently and nothing is committed until all
/// have returned, so readers never see a partially replayed book. A failed
/// stream is marked `Failed` while the others still commit.
pub async fn replay_history(
    source: &dyn SettlementSource,
    state: &SharedState,
    from_block: u64,
) -> Result<ReplaySummary, ReplayError> {
    let to_block = match source.latest_block().await {
        Ok(block) => block,
        Err(e) => {
            let mut guard = state.write().await;
            for kind in EventKind::HISTORICAL {
                guard
                    .statuses
                    .set(kind, StreamStatus::Failed(e.to_string()));
            }
            return Err(ReplayError::Head(e));
        }
    };

    let results = join_all(
        EventKind::HISTORICAL
            .into_iter()
            .map(|kind| source.query_past_events(kind, from_block, to_block)),
    )
    .await;

    let mut summary = ReplaySummary {
        to_block,
        ..Default::default()
    };
    let mut guard = state.write().await;
    for (kind, result) in EventKind::HISTORICAL.into_iter().zip(results) {
        match result {
            Ok(logs) => {
                let fetched = logs.len();
                let inserted = guard.events.load_history(normalize_logs(kind, logs));
                guard.statuses.mark_loaded(kind);
                info!(
                    "Replayed {} stream: fetched={}, new={}, blocks {}..={}",
                    kind, fetched, inserted, from_block, to_block
                );
                summary.inserted.insert(kind, inserted);
            }
            Err(e) => {
                warn!("Replay of {} stream failed: {}", kind, e);
                guard
                    .statuses
                    .set(kind, StreamStatus::Failed(e.to_string()));
                summary.failed.push(kind);
            }
        }
    }

    Ok(summary)
}

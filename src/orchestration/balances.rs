//! Balance snapshot re-fetch for the session account.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::datasource::{BalanceScope, SettlementSource, SourceError};
use crate::domain::{AccountBalanceSnapshot, Address};
use crate::store::SharedState;

/// Reads the four balances of one account and stores the snapshot.
#[derive(Debug, Clone)]
pub struct BalanceRefresher {
    source: Arc<dyn SettlementSource>,
    state: SharedState,
    account: Address,
    token: Address,
}

impl BalanceRefresher {
    pub fn new(
        source: Arc<dyn SettlementSource>,
        state: SharedState,
        account: Address,
        token: Address,
    ) -> Self {
        Self {
            source,
            state,
            account,
            token,
        }
    }

    /// Fetch wallet and exchange balances for the native asset and the token.
    ///
    /// On failure the previous snapshot is kept. When a newer refresh started
    /// while this one was in flight, the result is returned but not stored.
    pub async fn refresh(&self) -> Result<AccountBalanceSnapshot, SourceError> {
        let generation = self.state.write().await.begin_balance_refresh();

        let native = Address::native();
        let result = tokio::try_join!(
            self.source
                .get_balance(BalanceScope::Wallet, &native, &self.account),
            self.source
                .get_balance(BalanceScope::Wallet, &self.token, &self.account),
            self.source
                .get_balance(BalanceScope::Exchange, &native, &self.account),
            self.source
                .get_balance(BalanceScope::Exchange, &self.token, &self.account),
        );

        let snapshot = result.map(
            |(wallet_native, wallet_token, exchange_native, exchange_token)| {
                AccountBalanceSnapshot {
                    account: self.account.clone(),
                    wallet_native,
                    wallet_token,
                    exchange_native,
                    exchange_token,
                    fetched_at: Utc::now(),
                }
            },
        );

        let stored = self
            .state
            .write()
            .await
            .finish_balance_refresh(generation, snapshot.as_ref().ok().cloned());
        if !stored {
            debug!(
                "Balance refresh {} for {} superseded by a newer one",
                generation, self.account
            );
        } else if snapshot.is_ok() {
            debug!("Balances refreshed for {}", self.account);
        }
        snapshot
    }

    /// Run `refresh` as an independent task; failures are logged.
    pub fn spawn_refresh(&self) -> JoinHandle<()> {
        let refresher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = refresher.refresh().await {
                warn!("Balance refresh for {} failed: {}", refresher.account, e);
            }
        })
    }
}

//! Command submission on behalf of the session account.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::datasource::{SettlementSource, SourceError};
use crate::domain::{Address, AmountError, BaseUnits, Command, OrderId, OrderType};
use crate::store::SharedState;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no session account configured")]
    NoAccount,
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),
    #[error("submission rejected: {0}")]
    Rejected(String),
    #[error("settlement unavailable: {0}")]
    Transport(SourceError),
}

impl From<SourceError> for CommandError {
    fn from(err: SourceError) -> Self {
        match err {
            SourceError::Rejected(reason) => CommandError::Rejected(reason),
            other => CommandError::Transport(other),
        }
    }
}

/// Acknowledgment of an accepted command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submitted {
    pub request_id: Uuid,
    pub command: Command,
    pub transaction_hash: String,
}

/// Which asset a deposit or withdrawal moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Native,
    Token,
}

/// Builds commands, submits them and raises the matching pending flag.
///
/// Returns as soon as the settlement layer acknowledges; the flag is
/// cleared when the resulting event is applied.
#[derive(Debug, Clone)]
pub struct CommandService {
    source: Arc<dyn SettlementSource>,
    state: SharedState,
    account: Option<Address>,
    token: Address,
}

impl CommandService {
    pub fn new(
        source: Arc<dyn SettlementSource>,
        state: SharedState,
        account: Option<Address>,
        token: Address,
    ) -> Self {
        Self {
            source,
            state,
            account,
            token,
        }
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    async fn submit(&self, command: Command) -> Result<Submitted, CommandError> {
        let from = self.account.as_ref().ok_or(CommandError::NoAccount)?;
        let request_id = Uuid::new_v4();
        match self.source.submit(from, &command).await {
            Ok(transaction_hash) => {
                info!(
                    %request_id,
                    command = command.name(),
                    tx = %transaction_hash,
                    "Command submitted"
                );
                Ok(Submitted {
                    request_id,
                    command,
                    transaction_hash,
                })
            }
            Err(e) => {
                warn!(%request_id, command = command.name(), "Command failed: {}", e);
                Err(e.into())
            }
        }
    }

    /// Offer `amount * price` native units for `amount` tokens.
    pub async fn make_buy_order(
        &self,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Submitted, CommandError> {
        self.make_order(OrderType::Buy, amount, price).await
    }

    /// Offer `amount` tokens for `amount * price` native units.
    pub async fn make_sell_order(
        &self,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Submitted, CommandError> {
        self.make_order(OrderType::Sell, amount, price).await
    }

    async fn make_order(
        &self,
        side: OrderType,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Submitted, CommandError> {
        let command = Command::limit_order(side, &self.token, amount, price)?;
        let submitted = self.submit(command).await?;
        self.state.write().await.pending.order_making(side);
        Ok(submitted)
    }

    pub async fn cancel_order(&self, id: OrderId) -> Result<Submitted, CommandError> {
        let submitted = self.submit(Command::CancelOrder { id }).await?;
        self.state.write().await.pending.order_cancelling = true;
        Ok(submitted)
    }

    pub async fn fill_order(&self, id: OrderId) -> Result<Submitted, CommandError> {
        let submitted = self.submit(Command::FillOrder { id }).await?;
        self.state.write().await.pending.order_filling = true;
        Ok(submitted)
    }

    /// Deposit into the exchange.
    ///
    /// A token deposit first approves the exchange to pull `amount`; the
    /// deposit is only sent once the approval is acknowledged. The returned
    /// acknowledgment is the deposit's.
    pub async fn deposit(&self, asset: Asset, amount: Decimal) -> Result<Submitted, CommandError> {
        let amount = BaseUnits::from_decimal(amount)?;
        let submitted = match asset {
            Asset::Native => self.submit(Command::DepositNative { amount }).await?,
            Asset::Token => {
                self.submit(Command::ApproveToken {
                    token: self.token.clone(),
                    amount,
                })
                .await?;
                self.submit(Command::DepositToken {
                    token: self.token.clone(),
                    amount,
                })
                .await?
            }
        };
        self.state.write().await.pending.balances_loading = true;
        Ok(submitted)
    }

    pub async fn withdraw(&self, asset: Asset, amount: Decimal) -> Result<Submitted, CommandError> {
        let amount = BaseUnits::from_decimal(amount)?;
        let command = match asset {
            Asset::Native => Command::WithdrawNative { amount },
            Asset::Token => Command::WithdrawToken {
                token: self.token.clone(),
                amount,
            },
        };
        let submitted = self.submit(command).await?;
        self.state.write().await.pending.balances_loading = true;
        Ok(submitted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::MockSettlement;
    use crate::store::ExchangeState;
    use std::str::FromStr;

    fn account() -> Address {
        Address::from_str("0x1111111111111111111111111111111111111111").unwrap()
    }

    fn token() -> Address {
        Address::from_str("0x3333333333333333333333333333333333333333").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn service(source: &MockSettlement, state: &SharedState) -> CommandService {
        CommandService::new(
            Arc::new(source.clone()),
            state.clone(),
            Some(account()),
            token(),
        )
    }

    #[tokio::test]
    async fn test_buy_order_sets_flag_and_submits() {
        let source = MockSettlement::new();
        let state = ExchangeState::shared();
        let submitted = service(&source, &state)
            .make_buy_order(dec("10"), dec("0.1"))
            .await
            .unwrap();
        assert!(submitted.transaction_hash.starts_with("0x"));

        let sent = source.submitted();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, account());
        let Command::MakeOrder { amount_give, token_give, .. } = &sent[0].1 else {
            panic!("expected MakeOrder");
        };
        assert!(token_give.is_native());
        assert_eq!(amount_give.to_decimal_string(), "1");
        assert!(state.read().await.pending.buy_order_making);
        assert!(!state.read().await.pending.sell_order_making);
    }

    #[tokio::test]
    async fn test_rejection_leaves_flags() {
        let source = MockSettlement::new().rejecting_commands("order not found");
        let state = ExchangeState::shared();
        let err = service(&source, &state)
            .cancel_order(OrderId::new(4))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Rejected(ref r) if r == "order not found"));
        assert!(!state.read().await.pending.order_cancelling);
    }

    #[tokio::test]
    async fn test_token_deposit_approves_first() {
        let source = MockSettlement::new();
        let state = ExchangeState::shared();
        service(&source, &state)
            .deposit(Asset::Token, dec("2.5"))
            .await
            .unwrap();
        let names: Vec<&str> = source.submitted().iter().map(|(_, c)| c.name()).collect();
        assert_eq!(names, vec!["approveToken", "depositToken"]);
        assert!(state.read().await.pending.balances_loading);
    }

    #[tokio::test]
    async fn test_no_account() {
        let source = MockSettlement::new();
        let state = ExchangeState::shared();
        let service = CommandService::new(Arc::new(source.clone()), state, None, token());
        let err = service.fill_order(OrderId::new(1)).await.unwrap_err();
        assert!(matches!(err, CommandError::NoAccount));
        assert!(source.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_amount() {
        let source = MockSettlement::new();
        let state = ExchangeState::shared();
        let err = service(&source, &state)
            .withdraw(Asset::Native, dec("-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::InvalidAmount(_)));
    }
}

//! Settlement-layer abstraction: event queries, balance reads and command submission.

use crate::domain::{Address, BaseUnits, Command, EventKind, EventLog};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod gateway;
pub mod mock;

pub use gateway::GatewaySettlement;
pub use mock::MockSettlement;

/// Which ledger a balance read targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BalanceScope {
    /// The account's own holdings outside the exchange.
    Wallet,
    /// Funds the exchange contract custodies for the account.
    Exchange,
}

/// The settlement contract as seen by this service.
///
/// Live subscriptions are built on top of `latest_block` and
/// `query_past_events` by the orchestration layer.
#[async_trait]
pub trait SettlementSource: Send + Sync + fmt::Debug {
    /// Current head block.
    async fn latest_block(&self) -> Result<u64, SourceError>;

    /// Fetch every `kind` log in `[from_block, to_block]`, in emission order.
    async fn query_past_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EventLog>, SourceError>;

    /// Read one balance. `token` may be the native-asset sentinel.
    async fn get_balance(
        &self,
        scope: BalanceScope,
        token: &Address,
        account: &Address,
    ) -> Result<BaseUnits, SourceError>;

    /// Submit a command on behalf of `from`.
    ///
    /// # Returns
    /// The transaction hash once the settlement layer has accepted the call.
    /// Acceptance is not settlement: the outcome arrives later as an event.
    async fn submit(&self, from: &Address, command: &Command) -> Result<String, SourceError>;
}

/// Error type for settlement operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network error (e.g., connection refused, timeout)
    NetworkError(String),
    /// Non-success HTTP status from the gateway
    HttpError { status: u16, message: String },
    /// Invalid JSON or unexpected response shape
    ParseError(String),
    /// Rate limit exceeded
    RateLimited,
    /// The settlement layer refused a submitted command
    Rejected(String),
    /// Other error
    Other(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            SourceError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            SourceError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            SourceError::RateLimited => write!(f, "Rate limited"),
            SourceError::Rejected(reason) => write!(f, "Submission rejected: {}", reason),
            SourceError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for SourceError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_error_display() {
        let err = SourceError::NetworkError("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = SourceError::HttpError {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP error 502: Bad gateway");

        let err = SourceError::Rejected("insufficient balance".to_string());
        assert_eq!(err.to_string(), "Submission rejected: insufficient balance");
    }

    #[test]
    fn test_balance_scope_wire_names() {
        assert_eq!(serde_json::to_value(BalanceScope::Wallet).unwrap(), "wallet");
        assert_eq!(serde_json::to_value(BalanceScope::Exchange).unwrap(), "exchange");
    }
}

//! Deposit/withdraw ledger events and the per-account balance snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{format_balance, Address, BaseUnits, EventKind};

/// A Deposit or Withdraw event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceEvent {
    /// Stable unique identifier for this event.
    ///
    /// Priority: `tx_hash` (if present) > hash of deterministic fields.
    pub event_key: String,
    pub kind: EventKind,
    pub token: Address,
    pub user: Address,
    pub amount: BaseUnits,
    /// Custodied balance after the event.
    pub balance: BaseUnits,
    pub block: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl BalanceEvent {
    pub fn new(
        kind: EventKind,
        token: Address,
        user: Address,
        amount: BaseUnits,
        balance: BaseUnits,
        block: u64,
        tx_hash: Option<String>,
    ) -> Self {
        let tx_hash = normalize_tx_hash(tx_hash);
        let event_key =
            Self::compute_event_key(kind, &token, &user, &amount, &balance, block, tx_hash.as_deref());
        Self {
            event_key,
            kind,
            token,
            user,
            amount,
            balance,
            block,
            tx_hash,
        }
    }

    /// Compute a stable key for this event.
    ///
    /// When `tx_hash` is unavailable the key is a SHA-256 digest truncated to
    /// 128 bits over every field of the event, including its stream and block.
    pub fn compute_event_key(
        kind: EventKind,
        token: &Address,
        user: &Address,
        amount: &BaseUnits,
        balance: &BaseUnits,
        block: u64,
        tx_hash: Option<&str>,
    ) -> String {
        if let Some(tx) = tx_hash.filter(|s| !s.trim().is_empty()) {
            return tx.trim().to_lowercase();
        }

        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, kind.as_str());
        hasher.update(block.to_le_bytes());
        hash_var(&mut hasher, token.as_str());
        hash_var(&mut hasher, user.as_str());
        hash_var(&mut hasher, &amount.to_string());
        hash_var(&mut hasher, &balance.to_string());

        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }
}

fn normalize_tx_hash(tx_hash: Option<String>) -> Option<String> {
    tx_hash
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_lowercase())
}

/// Point-in-time balances for one account, read from the settlement contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountBalanceSnapshot {
    pub account: Address,
    pub wallet_native: BaseUnits,
    pub wallet_token: BaseUnits,
    pub exchange_native: BaseUnits,
    pub exchange_token: BaseUnits,
    pub fetched_at: DateTime<Utc>,
}

/// Snapshot rendered for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormattedBalances {
    pub wallet_native: String,
    pub wallet_token: String,
    pub exchange_native: String,
    pub exchange_token: String,
}

impl AccountBalanceSnapshot {
    pub fn formatted(&self, decimals: usize) -> FormattedBalances {
        FormattedBalances {
            wallet_native: format_balance(Some(&self.wallet_native), decimals),
            wallet_token: format_balance(Some(&self.wallet_token), decimals),
            exchange_native: format_balance(Some(&self.exchange_native), decimals),
            exchange_token: format_balance(Some(&self.exchange_token), decimals),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn addr(s: &str) -> Address {
        Address::from_str(s).unwrap()
    }

    #[test]
    fn test_event_key_prefers_tx_hash() {
        let event = BalanceEvent::new(
            EventKind::Deposit,
            Address::native(),
            addr("0x1111111111111111111111111111111111111111"),
            BaseUnits::from(1),
            BaseUnits::from(1),
            5,
            Some(" 0xDEADBEEF ".to_string()),
        );
        assert_eq!(event.event_key, "0xdeadbeef");
        assert_eq!(event.tx_hash.as_deref(), Some("0xdeadbeef"));
    }

    #[test]
    fn test_event_key_falls_back_to_hash() {
        let user = addr("0x1111111111111111111111111111111111111111");
        let event = |kind, balance: u64, block, tx: Option<&str>| {
            BalanceEvent::new(
                kind,
                Address::native(),
                user.clone(),
                BaseUnits::from(10),
                BaseUnits::from(balance),
                block,
                tx.map(str::to_string),
            )
        };
        let first = event(EventKind::Deposit, 10, 5, None);
        let blank_hash = event(EventKind::Deposit, 10, 5, Some("  "));
        assert!(first.event_key.starts_with("hash:"));
        assert_eq!(first.event_key, blank_hash.event_key);
        assert_ne!(first.event_key, event(EventKind::Deposit, 20, 5, None).event_key);
        assert_ne!(first.event_key, event(EventKind::Withdraw, 10, 5, None).event_key);
        assert_ne!(first.event_key, event(EventKind::Deposit, 10, 6, None).event_key);
    }

    #[test]
    fn test_snapshot_formats_each_facet() {
        let snapshot = AccountBalanceSnapshot {
            account: addr("0x1111111111111111111111111111111111111111"),
            wallet_native: BaseUnits::from_decimal_str("1.23456").unwrap(),
            wallet_token: BaseUnits::zero(),
            exchange_native: BaseUnits::from_decimal_str("0.5").unwrap(),
            exchange_token: BaseUnits::from_decimal_str("100").unwrap(),
            fetched_at: Utc::now(),
        };
        let formatted = snapshot.formatted(2);
        assert_eq!(formatted.wallet_native, "1.23");
        assert_eq!(formatted.wallet_token, "0.00");
        assert_eq!(formatted.exchange_native, "0.50");
        assert_eq!(formatted.exchange_token, "100.00");
    }
}

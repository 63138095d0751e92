//! Domain primitives: TimeSec, Address, OrderId, OrderType, PriceDirection.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Address the settlement layer uses in place of a token contract to denote
/// the chain's native asset.
pub const NATIVE_ASSET: &str = "0x0000000000000000000000000000000000000000";

/// Settlement payloads encode integers either as JSON strings or numbers.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StrOrNum {
    Str(String),
    Num(u64),
}

impl StrOrNum {
    pub(crate) fn into_u64(self) -> Result<u64, String> {
        match self {
            StrOrNum::Num(n) => Ok(n),
            StrOrNum::Str(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| format!("invalid integer: {:?}", s)),
        }
    }
}

/// Ledger-assigned time in seconds since Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TimeSec(pub i64);

impl TimeSec {
    /// Create a TimeSec from epoch seconds.
    pub fn new(secs: i64) -> Self {
        TimeSec(secs)
    }

    /// Get the underlying seconds value.
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Convert to a UTC datetime; out-of-range values clamp to the epoch.
    pub fn to_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.0, 0)
            .single()
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for TimeSec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let secs = StrOrNum::deserialize(deserializer)?
            .into_u64()
            .map_err(serde::de::Error::custom)?;
        i64::try_from(secs)
            .map(TimeSec)
            .map_err(|_| serde::de::Error::custom("timestamp out of range"))
    }
}

/// Order identifier assigned by the settlement contract.
///
/// Unique per placed order and the join key across the Order, Cancel and
/// Trade streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OrderId(pub u64);

impl OrderId {
    pub fn new(id: u64) -> Self {
        OrderId(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl<'de> Deserialize<'de> for OrderId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        StrOrNum::deserialize(deserializer)?
            .into_u64()
            .map(OrderId)
            .map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(pub String);

/// Account or token address (lowercase 0x-prefixed hex).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Address(String);

impl Address {
    /// The native-asset sentinel.
    pub fn native() -> Self {
        Address(NATIVE_ASSET.to_string())
    }

    pub fn is_native(&self) -> bool {
        self.0 == NATIVE_ASSET
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parsed = alloy_primitives::Address::from_str(s.trim())
            .map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Address(format!("0x{}", hex::encode(parsed.as_slice()))))
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Address::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Order side from the maker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Maker gives the native asset for tokens.
    Buy,
    /// Maker gives tokens for the native asset.
    Sell,
}

impl OrderType {
    /// The side a counterparty takes against this one.
    pub fn opposite(&self) -> Self {
        match self {
            OrderType::Buy => OrderType::Sell,
            OrderType::Sell => OrderType::Buy,
        }
    }

    /// Display class used by the presentation layer.
    pub fn css_class(&self) -> &'static str {
        match self {
            OrderType::Buy => "success",
            OrderType::Sell => "danger",
        }
    }

    /// `+` for buys, `-` for sells.
    pub fn sign(&self) -> char {
        match self {
            OrderType::Buy => '+',
            OrderType::Sell => '-',
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Buy => write!(f, "buy"),
            OrderType::Sell => write!(f, "sell"),
        }
    }
}

/// Price movement of a trade relative to the trade before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceDirection {
    Up,
    Down,
}

impl PriceDirection {
    pub fn css_class(&self) -> &'static str {
        match self {
            PriceDirection::Up => "success",
            PriceDirection::Down => "danger",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_normalizes_case() {
        let addr = Address::from_str("0xABCDEF0123456789abcdef0123456789ABCDEF01").unwrap();
        assert_eq!(addr.as_str(), "0xabcdef0123456789abcdef0123456789abcdef01");
    }

    #[test]
    fn test_address_rejects_malformed() {
        assert!(Address::from_str("abc").is_err());
        assert!(Address::from_str("0x123").is_err());
        assert!(Address::from_str("0xzz00000000000000000000000000000000000000").is_err());
        assert!(Address::from_str("0x11111111111111111111111111111111111111111111").is_err());
    }

    #[test]
    fn test_native_sentinel() {
        assert!(Address::native().is_native());
        let parsed = Address::from_str(NATIVE_ASSET).unwrap();
        assert!(parsed.is_native());
    }

    #[test]
    fn test_order_id_accepts_string_or_number() {
        let a: OrderId = serde_json::from_str("\"42\"").unwrap();
        let b: OrderId = serde_json::from_str("42").unwrap();
        assert_eq!(a, b);
        assert!(serde_json::from_str::<OrderId>("\"x\"").is_err());
    }

    #[test]
    fn test_order_type_serialization() {
        assert_eq!(serde_json::to_string(&OrderType::Buy).unwrap(), "\"buy\"");
        assert_eq!(OrderType::Buy.opposite(), OrderType::Sell);
        assert_eq!(OrderType::Sell.sign(), '-');
    }

    #[test]
    fn test_timesec_to_utc() {
        let t = TimeSec::new(3600);
        assert_eq!(t.to_utc().timestamp(), 3600);
    }
}

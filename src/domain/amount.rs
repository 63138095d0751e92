//! Fixed-point amounts in ledger base units (18 decimals).
//!
//! All conversions go through 256-bit integer arithmetic so large token
//! supplies never pass through floating point.

use alloy_primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::primitives::StrOrNum;

/// Number of fractional digits in one display unit.
pub const DECIMALS: usize = 18;

const UNIT: u64 = 1_000_000_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("invalid amount: {0:?}")]
    Invalid(String),
    #[error("negative amount: {0}")]
    Negative(String),
    #[error("amount {0} has more than 18 fractional digits")]
    TooPrecise(String),
    #[error("amount {0} overflows 256 bits")]
    Overflow(String),
}

/// Non-negative integer amount in base units (1 display unit = 10^18).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BaseUnits(U256);

impl BaseUnits {
    pub fn zero() -> Self {
        BaseUnits(U256::ZERO)
    }

    pub fn as_u256(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Parse an integer base-unit string (decimal, or `0x` hex).
    pub fn from_base_str(s: &str) -> Result<Self, AmountError> {
        U256::from_str(s.trim())
            .map(BaseUnits)
            .map_err(|_| AmountError::Invalid(s.to_string()))
    }

    /// `toBaseUnits`: scale a human-readable decimal amount by 10^18.
    ///
    /// # Errors
    /// Rejects negative values, more than 18 fractional digits and malformed
    /// text.
    pub fn from_decimal_str(s: &str) -> Result<Self, AmountError> {
        let text = s.trim();
        if text.starts_with('-') {
            return Err(AmountError::Negative(s.to_string()));
        }
        let text = text.strip_prefix('+').unwrap_or(text);
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::Invalid(s.to_string()));
        }
        if !int_part.chars().all(|c| c.is_ascii_digit())
            || !frac_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(AmountError::Invalid(s.to_string()));
        }
        let frac_trimmed = frac_part.trim_end_matches('0');
        if frac_trimmed.len() > DECIMALS {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let int_value = if int_part.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(int_part, 10).map_err(|_| AmountError::Overflow(s.to_string()))?
        };
        let frac_value = if frac_trimmed.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", frac_trimmed, width = DECIMALS);
            U256::from_str_radix(&padded, 10).map_err(|_| AmountError::Invalid(s.to_string()))?
        };

        int_value
            .checked_mul(U256::from(UNIT))
            .and_then(|scaled| scaled.checked_add(frac_value))
            .map(BaseUnits)
            .ok_or_else(|| AmountError::Overflow(s.to_string()))
    }

    /// `toBaseUnits` for an already-parsed decimal.
    pub fn from_decimal(value: Decimal) -> Result<Self, AmountError> {
        Self::from_decimal_str(&value.normalize().to_string())
    }

    /// `fromBaseUnits`: render as a decimal string without trailing zeros.
    pub fn to_decimal_string(&self) -> String {
        let unit = U256::from(UNIT);
        let int_part = self.0 / unit;
        let frac_part = self.0 % unit;
        if frac_part.is_zero() {
            return int_part.to_string();
        }
        let frac = format!("{:0>width$}", frac_part.to_string(), width = DECIMALS);
        format!("{}.{}", int_part, frac.trim_end_matches('0'))
    }
}

/// `formatBalance`: truncate to `decimals` fractional digits, `0` when absent.
pub fn format_balance(balance: Option<&BaseUnits>, decimals: usize) -> String {
    let Some(balance) = balance else {
        return "0".to_string();
    };
    let unit = U256::from(UNIT);
    let int_part = balance.0 / unit;
    if decimals == 0 {
        return int_part.to_string();
    }
    let frac = format!("{:0>width$}", (balance.0 % unit).to_string(), width = DECIMALS);
    let shown = &frac[..decimals.min(DECIMALS)];
    format!("{}.{:0<width$}", int_part, shown, width = decimals)
}

impl fmt::Display for BaseUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for BaseUnits {
    fn from(value: u64) -> Self {
        BaseUnits(U256::from(value))
    }
}

impl Serialize for BaseUnits {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for BaseUnits {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match StrOrNum::deserialize(deserializer)? {
            StrOrNum::Str(s) => BaseUnits::from_base_str(&s).map_err(serde::de::Error::custom),
            StrOrNum::Num(n) => Ok(BaseUnits::from(n)),
        }
    }
}

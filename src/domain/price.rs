//! Display price of an order in native units per token.

use alloy_primitives::U256;
use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::BaseUnits;

/// Fractional digits kept on a price.
pub const PRICE_SCALE: u32 = 5;

const PRICE_PRECISION: u64 = 100_000;

/// Token price rounded to five decimal places.
///
/// Serializes as a JSON number. The rounding is `round(ratio * 100000) / 100000`
/// with halves rounding up; comparisons between trades rely on it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Price {
    pub fn zero() -> Self {
        Price(RustDecimal::ZERO)
    }

    /// Price of `token_amount` tokens costing `ether_amount`, both in base units.
    ///
    /// The ratio is computed on the integers and rounded once, so the
    /// 10^18 scale cancels without loss. A zero token leg prices at zero.
    pub fn from_amounts(ether_amount: &BaseUnits, token_amount: &BaseUnits) -> Self {
        let denom = token_amount.as_u256();
        if denom.is_zero() {
            return Price::zero();
        }
        let scaled = ether_amount
            .as_u256()
            .checked_mul(U256::from(PRICE_PRECISION));
        let Some(scaled) = scaled else {
            return Price(RustDecimal::MAX);
        };
        let mut quotient = scaled / denom;
        let remainder = scaled % denom;
        // Half-up: remainder * 2 >= denom, written to avoid overflow.
        if remainder >= denom - remainder {
            quotient += U256::from(1u8);
        }
        u128::try_from(quotient)
            .ok()
            .and_then(|q| i128::try_from(q).ok())
            .and_then(|q| RustDecimal::try_from_i128_with_scale(q, PRICE_SCALE).ok())
            .map(|d| Price(d.normalize()))
            .unwrap_or(Price(RustDecimal::MAX))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> BaseUnits {
        BaseUnits::from_decimal_str(s).unwrap()
    }

    #[test]
    fn test_price_rounds_to_five_places() {
        let price = Price::from_amounts(&units("3"), &units("7"));
        assert_eq!(price.to_string(), "0.42857");
    }

    #[test]
    fn test_price_rounds_half_up() {
        // 1 / 8 = 0.125 exactly; 1 / 200000 = 0.000005 -> 0.00001
        assert_eq!(
            Price::from_amounts(&units("1"), &units("8")).to_string(),
            "0.125"
        );
        assert_eq!(
            Price::from_amounts(&units("1"), &units("200000")).to_string(),
            "0.00001"
        );
        assert_eq!(
            Price::from_amounts(&units("1"), &units("300000")).to_string(),
            "0"
        );
    }

    #[test]
    fn test_price_zero_token_leg() {
        assert!(Price::from_amounts(&units("1"), &BaseUnits::zero()).is_zero());
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::from_amounts(&units("1"), &units("10"));
        let json = serde_json::to_value(price).unwrap();
        assert!(json.is_number());
        assert_eq!(json.to_string(), "0.1");
    }

    #[test]
    fn test_price_ordering() {
        let low = Price::from_amounts(&units("1"), &units("10"));
        let high = Price::from_amounts(&units("2"), &units("10"));
        assert!(low < high);
    }
}

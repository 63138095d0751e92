//! State-changing calls submitted to the settlement contract.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Address, AmountError, BaseUnits, OrderId, OrderType};

/// A contract call. The settlement gateway signs and broadcasts it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    MakeOrder {
        token_get: Address,
        amount_get: BaseUnits,
        token_give: Address,
        amount_give: BaseUnits,
    },
    CancelOrder {
        id: OrderId,
    },
    FillOrder {
        id: OrderId,
    },
    DepositNative {
        amount: BaseUnits,
    },
    WithdrawNative {
        amount: BaseUnits,
    },
    /// Allow the exchange to pull `amount` of `token` from the sender.
    ApproveToken {
        token: Address,
        amount: BaseUnits,
    },
    DepositToken {
        token: Address,
        amount: BaseUnits,
    },
    WithdrawToken {
        token: Address,
        amount: BaseUnits,
    },
}

impl Command {
    /// Build a limit order for `amount` tokens at `price` native units each.
    ///
    /// A buy gives `amount * price` of the native asset for `amount` tokens;
    /// a sell is the mirror image.
    ///
    /// # Errors
    /// Fails if either leg is negative or has more than 18 fractional digits.
    pub fn limit_order(
        side: OrderType,
        token: &Address,
        amount: Decimal,
        price: Decimal,
    ) -> Result<Self, AmountError> {
        let total = amount
            .checked_mul(price)
            .ok_or_else(|| AmountError::Overflow(format!("{} * {}", amount, price)))?;
        let token_leg = BaseUnits::from_decimal(amount)?;
        let native_leg = BaseUnits::from_decimal(total)?;
        Ok(match side {
            OrderType::Buy => Command::MakeOrder {
                token_get: token.clone(),
                amount_get: token_leg,
                token_give: Address::native(),
                amount_give: native_leg,
            },
            OrderType::Sell => Command::MakeOrder {
                token_get: Address::native(),
                amount_get: native_leg,
                token_give: token.clone(),
                amount_give: token_leg,
            },
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::MakeOrder { .. } => "makeOrder",
            Command::CancelOrder { .. } => "cancelOrder",
            Command::FillOrder { .. } => "fillOrder",
            Command::DepositNative { .. } => "depositNative",
            Command::WithdrawNative { .. } => "withdrawNative",
            Command::ApproveToken { .. } => "approveToken",
            Command::DepositToken { .. } => "depositToken",
            Command::WithdrawToken { .. } => "withdrawToken",
        }
    }
}

use crate::error::ApiError;
use crate::models::app_state::rate_table::RateTable;
use crate::models::entities::enum_types::WalletStatus;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Subscription,
    Prepaid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grant {
    pub kind: AccessKind,
    /// Amount the caller must debit before performing the action. Zero for subscriptions.
    pub charge: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum Denial {
    AccountBlocked,
    WalletInactive,
    InsufficientBalance { required: Decimal, current: Decimal },
}

impl Denial {
    /// Same error the wallet engine raises, so an eager denial and a lost debit race look alike.
    pub fn into_error(self) -> ApiError {
        match self {
            Denial::AccountBlocked => ApiError::AccountBlocked,
            Denial::WalletInactive => ApiError::WalletInactive,
            Denial::InsufficientBalance { required, current } => {
                ApiError::InsufficientBalance { required, current }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Grant(Grant),
    Denial(Denial),
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Grant(_))
    }

    pub fn into_result(self) -> Result<Grant, ApiError> {
        match self {
            AccessDecision::Grant(grant) => Ok(grant),
            AccessDecision::Denial(denial) => Err(denial.into_error()),
        }
    }
}

/// Outcome of a metered action that passed both the evaluator and the debit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChargeReceipt {
    pub access: AccessKind,
    pub charged: Decimal,
    /// Wallet balance after the debit; `None` when a subscription covered the action.
    pub balance: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceCheck {
    pub balance: Decimal,
    pub wallet_status: WalletStatus,
    pub access: AccessKind,
    pub subscription_end: Option<NaiveDate>,
    pub can_submit_basic: bool,
    pub can_submit_realtime: bool,
    pub rates: RateTable,
}

use crate::models::entities::enum_types::WalletStatus;
use crate::models::entities::wallet::Wallet;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct WalletSummary {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub status: WalletStatus,
    pub valid_until: Option<NaiveDate>,
}

impl From<Wallet> for WalletSummary {
    fn from(wallet: Wallet) -> Self {
        Self {
            user_id: wallet.user_id,
            balance: wallet.balance,
            status: wallet.status,
            valid_until: wallet.valid_until,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LedgerTotals {
    pub credits: Decimal,
    pub debits: Decimal,
}

impl LedgerTotals {
    pub fn net(&self) -> Decimal {
        self.credits - self.debits
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReconciliationReport {
    pub user_id: Uuid,
    pub balance: Decimal,
    pub totals: LedgerTotals,
    /// Stored balance minus the ledger's net; zero when consistent.
    pub drift: Decimal,
}

impl ReconciliationReport {
    pub fn is_consistent(&self) -> bool {
        self.drift.is_zero()
    }
}

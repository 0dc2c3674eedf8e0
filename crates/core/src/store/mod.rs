use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::wallet_dto::LedgerTotals;
use walletgate_primitives::models::entities::{
    Account, AccountStatus, NewAccount, NewNotification, NewSubscription, NewTransaction,
    Notification, NotificationKind, Subscription, Transaction, Wallet, WalletStatus,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Writes made while a user's wallet row is held exclusively.
///
/// Nothing written through a unit is visible to other callers until the
/// surrounding [`LedgerStore::with_locked_wallet`] commits.
pub trait LedgerUnit {
    /// Wallet as seen inside the unit, including writes already staged.
    fn wallet(&self) -> &Wallet;

    fn find_credit_by_reference(&mut self, reference: &str)
        -> Result<Option<Transaction>, ApiError>;

    fn write_balance(&mut self, balance: Decimal) -> Result<(), ApiError>;

    fn write_status(
        &mut self,
        status: WalletStatus,
        valid_until: Option<NaiveDate>,
    ) -> Result<(), ApiError>;

    fn append_transaction(&mut self, entry: NewTransaction) -> Result<Transaction, ApiError>;
}

/// Work run against a locked wallet. Returns the transaction it appended, if any.
pub type LedgerOp<'a> =
    Box<dyn FnOnce(&mut dyn LedgerUnit) -> Result<Option<Transaction>, ApiError> + 'a>;

/// Boxes a closure as a [`LedgerOp`], letting the compiler infer its signature.
pub fn ledger_op<'a, F>(op: F) -> LedgerOp<'a>
where
    F: FnOnce(&mut dyn LedgerUnit) -> Result<Option<Transaction>, ApiError> + 'a,
{
    Box::new(op)
}

/// Committed result of a locked unit.
#[derive(Debug, Clone)]
pub struct LedgerOutcome {
    pub wallet: Wallet,
    pub transaction: Option<Transaction>,
}

impl LedgerOutcome {
    pub fn balance(&self) -> Decimal {
        self.wallet.balance
    }
}

/// Durable storage for accounts, wallets and the append-only transaction log.
///
/// Every method is blocking; async callers go through `spawn_blocking`.
pub trait LedgerStore: Send + Sync {
    /// Runs `op` while holding the user's wallet exclusively. Writes commit together
    /// when `op` returns `Ok` and are discarded otherwise.
    fn with_locked_wallet(&self, user_id: Uuid, op: LedgerOp<'_>)
        -> Result<LedgerOutcome, ApiError>;

    fn find_account(&self, user_id: Uuid) -> Result<Option<Account>, ApiError>;

    fn find_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, ApiError>;

    fn create_account_with_wallet(&self, account: NewAccount)
        -> Result<(Account, Wallet), ApiError>;

    fn set_account_status(&self, user_id: Uuid, status: AccountStatus)
        -> Result<Account, ApiError>;

    /// Newest first.
    fn transactions_for_user(&self, user_id: Uuid, limit: i64)
        -> Result<Vec<Transaction>, ApiError>;

    fn ledger_totals(&self, user_id: Uuid) -> Result<LedgerTotals, ApiError>;

    fn current_subscription(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Subscription>, ApiError>;

    fn insert_subscription(&self, subscription: NewSubscription) -> Result<Subscription, ApiError>;

    fn subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, ApiError>;

    /// Marks active subscriptions that ended before `today` as expired.
    fn expire_subscriptions(&self, today: NaiveDate) -> Result<usize, ApiError>;

    /// Active accounts whose wallet balance is below `threshold`.
    fn low_balance_candidates(&self, threshold: Decimal)
        -> Result<Vec<(Account, Wallet)>, ApiError>;

    /// Active accounts whose wallet validity ends in `(after, until]`.
    fn wallets_expiring(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Wallet)>, ApiError>;

    /// Active subscriptions of active accounts ending in `[from, until]`.
    fn subscriptions_ending(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Subscription)>, ApiError>;

    fn record_notification(&self, entry: NewNotification) -> Result<Notification, ApiError>;

    /// Atomically takes the user's alert slot for `kind` on `day` (UTC). Returns
    /// `false` when the slot was already taken.
    fn claim_daily_alert(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        day: NaiveDate,
    ) -> Result<bool, ApiError>;

    /// Newest first.
    fn notifications_for_user(&self, user_id: Uuid, limit: i64)
        -> Result<Vec<Notification>, ApiError>;
}

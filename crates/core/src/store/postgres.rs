use crate::repositories::account_repository::AccountRepository;
use crate::repositories::notification_repository::NotificationRepository;
use crate::repositories::subscription_repository::SubscriptionRepository;
use crate::repositories::transaction_repository::TransactionRepository;
use crate::repositories::wallet_repository::WalletRepository;
use crate::store::{LedgerOp, LedgerOutcome, LedgerStore, LedgerUnit};
use chrono::NaiveDate;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use rust_decimal::Decimal;
use std::time::Duration;
use tracing::error;
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::wallet_dto::LedgerTotals;
use walletgate_primitives::models::entities::{
    Account, AccountStatus, NewAccount, NewNotification, NewSubscription, NewTransaction,
    NewWallet, Notification, NotificationKind, Subscription, Transaction, Wallet, WalletStatus,
};

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// PostgreSQL ledger. Each locked unit is one database transaction holding the
/// wallet row `FOR UPDATE`.
#[derive(Clone)]
pub struct PgLedgerStore {
    pool: DbPool,
    lock_timeout: Duration,
}

impl PgLedgerStore {
    pub fn new(pool: DbPool, lock_timeout: Duration) -> Self {
        Self { pool, lock_timeout }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, ApiError> {
        self.pool.get().map_err(|e| {
            error!("ledger.store: failed to acquire db connection: {}", e);
            ApiError::DatabaseConnection(e.to_string())
        })
    }
}

struct PgLedgerUnit<'c> {
    conn: &'c mut PgConnection,
    wallet: Wallet,
}

impl LedgerUnit for PgLedgerUnit<'_> {
    fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    fn find_credit_by_reference(
        &mut self,
        reference: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        TransactionRepository::find_credit_by_reference(self.conn, reference)
    }

    fn write_balance(&mut self, balance: Decimal) -> Result<(), ApiError> {
        self.wallet = WalletRepository::set_balance(self.conn, self.wallet.id, balance)?;
        Ok(())
    }

    fn write_status(
        &mut self,
        status: WalletStatus,
        valid_until: Option<NaiveDate>,
    ) -> Result<(), ApiError> {
        self.wallet = WalletRepository::set_validity(self.conn, self.wallet.id, status, valid_until)?;
        Ok(())
    }

    fn append_transaction(&mut self, entry: NewTransaction) -> Result<Transaction, ApiError> {
        TransactionRepository::create(self.conn, &entry)
    }
}

impl LedgerStore for PgLedgerStore {
    fn with_locked_wallet(
        &self,
        user_id: Uuid,
        op: LedgerOp<'_>,
    ) -> Result<LedgerOutcome, ApiError> {
        let mut pooled = self.conn()?;
        let conn: &mut PgConnection = &mut pooled;
        let timeout_ms = self.lock_timeout.as_millis();

        conn.transaction::<LedgerOutcome, ApiError, _>(|conn| {
            // Bounded wait for the row lock; expiry surfaces as StorageConflict.
            diesel::sql_query(format!("SET LOCAL lock_timeout = '{}ms'", timeout_ms))
                .execute(conn)?;

            let wallet = WalletRepository::find_by_user_with_lock(conn, user_id)?;
            let mut unit = PgLedgerUnit { conn, wallet };

            let transaction = op(&mut unit)?;

            Ok(LedgerOutcome {
                wallet: unit.wallet,
                transaction,
            })
        })
    }

    fn find_account(&self, user_id: Uuid) -> Result<Option<Account>, ApiError> {
        AccountRepository::find_by_id(&mut *self.conn()?, user_id)
    }

    fn find_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, ApiError> {
        WalletRepository::find_by_user(&mut *self.conn()?, user_id)
    }

    fn create_account_with_wallet(
        &self,
        account: NewAccount,
    ) -> Result<(Account, Wallet), ApiError> {
        let mut pooled = self.conn()?;
        let conn: &mut PgConnection = &mut pooled;

        conn.transaction::<(Account, Wallet), ApiError, _>(|conn| {
            let account = AccountRepository::create(conn, &account)?;
            let wallet = WalletRepository::create(conn, &NewWallet::empty(account.id))?;
            Ok((account, wallet))
        })
    }

    fn set_account_status(
        &self,
        user_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, ApiError> {
        AccountRepository::update_status(&mut *self.conn()?, user_id, status)
    }

    fn transactions_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        TransactionRepository::find_recent_by_user(&mut *self.conn()?, user_id, limit)
    }

    fn ledger_totals(&self, user_id: Uuid) -> Result<LedgerTotals, ApiError> {
        TransactionRepository::totals_for_user(&mut *self.conn()?, user_id)
    }

    fn current_subscription(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Subscription>, ApiError> {
        SubscriptionRepository::find_current(&mut *self.conn()?, user_id, today)
    }

    fn insert_subscription(&self, subscription: NewSubscription) -> Result<Subscription, ApiError> {
        SubscriptionRepository::create(&mut *self.conn()?, &subscription)
    }

    fn subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, ApiError> {
        SubscriptionRepository::find_all_by_user(&mut *self.conn()?, user_id)
    }

    fn expire_subscriptions(&self, today: NaiveDate) -> Result<usize, ApiError> {
        SubscriptionRepository::expire_lapsed(&mut *self.conn()?, today)
    }

    fn low_balance_candidates(
        &self,
        threshold: Decimal,
    ) -> Result<Vec<(Account, Wallet)>, ApiError> {
        WalletRepository::find_low_balance(&mut *self.conn()?, threshold)
    }

    fn wallets_expiring(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Wallet)>, ApiError> {
        WalletRepository::find_expiring(&mut *self.conn()?, after, until)
    }

    fn subscriptions_ending(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Subscription)>, ApiError> {
        SubscriptionRepository::find_ending_between(&mut *self.conn()?, from, until)
    }

    fn record_notification(&self, entry: NewNotification) -> Result<Notification, ApiError> {
        NotificationRepository::create(&mut *self.conn()?, &entry)
    }

    fn claim_daily_alert(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        day: NaiveDate,
    ) -> Result<bool, ApiError> {
        let mut conn = self.conn()?;
        NotificationRepository::claim_for_day(&mut conn, user_id, kind, day)
    }

    fn notifications_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, ApiError> {
        NotificationRepository::find_recent_by_user(&mut *self.conn()?, user_id, limit)
    }
}

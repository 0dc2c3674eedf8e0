use crate::store::{LedgerOp, LedgerOutcome, LedgerStore, LedgerUnit};
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::wallet_dto::LedgerTotals;
use walletgate_primitives::models::entities::{
    Account, AccountStatus, EntryType, NewAccount, NewNotification, NewSubscription,
    NewTransaction, NewWallet, Notification, NotificationKind, Subscription, SubscriptionStatus,
    Transaction, Wallet, WalletStatus,
};

#[derive(Default)]
struct Tables {
    accounts: HashMap<Uuid, Account>,
    wallets: HashMap<Uuid, Wallet>,
    transactions: Vec<Transaction>,
    subscriptions: Vec<Subscription>,
    notifications: Vec<Notification>,
    alert_claims: HashSet<(Uuid, NotificationKind, NaiveDate)>,
}

impl Tables {
    fn credit_by_reference(&self, reference: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| {
            t.entry_type == EntryType::Credit && t.reference.as_deref() == Some(reference)
        })
    }

    fn active_account(&self, user_id: &Uuid) -> Option<&Account> {
        self.accounts.get(user_id).filter(|a| a.is_active())
    }
}

/// In-process ledger with the same locking contract as the PostgreSQL store.
///
/// Each wallet has its own mutex, so units for different users run in parallel.
/// Committed tables sit behind a read-write lock that is only taken briefly.
pub struct MemoryLedgerStore {
    lock_timeout: Duration,
    row_locks: DashMap<Uuid, Arc<Mutex<()>>>,
    tables: RwLock<Tables>,
}

impl MemoryLedgerStore {
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            lock_timeout,
            row_locks: DashMap::new(),
            tables: RwLock::new(Tables::default()),
        }
    }

    fn row_lock(&self, user_id: Uuid) -> Arc<Mutex<()>> {
        self.row_locks.entry(user_id).or_default().clone()
    }
}

impl Default for MemoryLedgerStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

struct MemoryLedgerUnit<'s> {
    tables: &'s RwLock<Tables>,
    wallet: Wallet,
    staged: Vec<Transaction>,
}

impl LedgerUnit for MemoryLedgerUnit<'_> {
    fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    fn find_credit_by_reference(
        &mut self,
        reference: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        let staged = self.staged.iter().find(|t| {
            t.entry_type == EntryType::Credit && t.reference.as_deref() == Some(reference)
        });
        if let Some(tx) = staged {
            return Ok(Some(tx.clone()));
        }

        Ok(self.tables.read().credit_by_reference(reference).cloned())
    }

    fn write_balance(&mut self, balance: Decimal) -> Result<(), ApiError> {
        if balance < Decimal::ZERO {
            return Err(ApiError::Internal(format!(
                "wallet {} balance would become negative",
                self.wallet.id
            )));
        }
        self.wallet.balance = balance;
        self.wallet.updated_at = Utc::now();
        Ok(())
    }

    fn write_status(
        &mut self,
        status: WalletStatus,
        valid_until: Option<NaiveDate>,
    ) -> Result<(), ApiError> {
        self.wallet.status = status;
        self.wallet.valid_until = valid_until;
        self.wallet.updated_at = Utc::now();
        Ok(())
    }

    fn append_transaction(&mut self, entry: NewTransaction) -> Result<Transaction, ApiError> {
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            amount: entry.amount,
            entry_type: entry.entry_type,
            reference: entry.reference,
            created_at: Utc::now(),
        };
        self.staged.push(tx.clone());
        Ok(tx)
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn with_locked_wallet(
        &self,
        user_id: Uuid,
        op: LedgerOp<'_>,
    ) -> Result<LedgerOutcome, ApiError> {
        if !self.tables.read().wallets.contains_key(&user_id) {
            return Err(ApiError::WalletNotFound(user_id));
        }

        let row = self.row_lock(user_id);
        let Some(_guard) = row.try_lock_for(self.lock_timeout) else {
            warn!(user_id = %user_id, "ledger.memory: wallet lock wait timed out");
            return Err(ApiError::StorageConflict(format!(
                "timed out waiting for wallet lock of user {}",
                user_id
            )));
        };

        let wallet = self
            .tables
            .read()
            .wallets
            .get(&user_id)
            .cloned()
            .ok_or(ApiError::WalletNotFound(user_id))?;

        let mut unit = MemoryLedgerUnit {
            tables: &self.tables,
            wallet,
            staged: Vec::new(),
        };

        // An error here drops the staged writes unapplied.
        let transaction = op(&mut unit)?;

        let MemoryLedgerUnit { wallet, staged, .. } = unit;
        let mut tables = self.tables.write();

        for tx in staged.iter().filter(|t| t.entry_type == EntryType::Credit) {
            if let Some(reference) = tx.reference.as_deref() {
                if tables.credit_by_reference(reference).is_some() {
                    return Err(ApiError::DuplicateReference(reference.to_string()));
                }
            }
        }

        tables.wallets.insert(user_id, wallet.clone());
        tables.transactions.extend(staged);

        Ok(LedgerOutcome {
            wallet,
            transaction,
        })
    }

    fn find_account(&self, user_id: Uuid) -> Result<Option<Account>, ApiError> {
        Ok(self.tables.read().accounts.get(&user_id).cloned())
    }

    fn find_wallet(&self, user_id: Uuid) -> Result<Option<Wallet>, ApiError> {
        Ok(self.tables.read().wallets.get(&user_id).cloned())
    }

    fn create_account_with_wallet(
        &self,
        account: NewAccount,
    ) -> Result<(Account, Wallet), ApiError> {
        let mut tables = self.tables.write();

        if tables.accounts.contains_key(&account.id)
            || tables.accounts.values().any(|a| a.email == account.email)
        {
            return Err(ApiError::Internal(format!(
                "account {} already exists",
                account.id
            )));
        }

        let now = Utc::now();
        let created = Account {
            id: account.id,
            name: account.name,
            email: account.email,
            mobile: account.mobile,
            role: account.role,
            status: AccountStatus::Active,
            created_at: now,
            updated_at: now,
        };

        let empty = NewWallet::empty(created.id);
        let wallet = Wallet {
            id: Uuid::new_v4(),
            user_id: empty.user_id,
            balance: empty.balance,
            status: empty.status,
            valid_until: empty.valid_until,
            created_at: now,
            updated_at: now,
        };

        tables.accounts.insert(created.id, created.clone());
        tables.wallets.insert(created.id, wallet.clone());

        Ok((created, wallet))
    }

    fn set_account_status(
        &self,
        user_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, ApiError> {
        let mut tables = self.tables.write();
        let account = tables
            .accounts
            .get_mut(&user_id)
            .ok_or(ApiError::AccountNotFound(user_id))?;

        account.status = status;
        account.updated_at = Utc::now();
        Ok(account.clone())
    }

    fn transactions_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .transactions
            .iter()
            .rev()
            .filter(|t| t.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }

    fn ledger_totals(&self, user_id: Uuid) -> Result<LedgerTotals, ApiError> {
        let tables = self.tables.read();
        let mut totals = LedgerTotals::default();

        for tx in tables.transactions.iter().filter(|t| t.user_id == user_id) {
            match tx.entry_type {
                EntryType::Credit => totals.credits += tx.amount,
                EntryType::Debit => totals.debits += tx.amount,
            }
        }

        Ok(totals)
    }

    fn current_subscription(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Subscription>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .subscriptions
            .iter()
            .filter(|s| s.user_id == user_id && s.is_current(today))
            .max_by_key(|s| (s.end_date, s.created_at))
            .cloned())
    }

    fn insert_subscription(&self, subscription: NewSubscription) -> Result<Subscription, ApiError> {
        let mut tables = self.tables.write();
        if !tables.accounts.contains_key(&subscription.user_id) {
            return Err(ApiError::AccountNotFound(subscription.user_id));
        }

        let created = Subscription {
            id: Uuid::new_v4(),
            user_id: subscription.user_id,
            plan_name: subscription.plan_name,
            amount: subscription.amount,
            start_date: subscription.start_date,
            end_date: subscription.end_date,
            status: subscription.status,
            created_at: Utc::now(),
        };
        tables.subscriptions.push(created.clone());

        Ok(created)
    }

    fn subscriptions_for_user(&self, user_id: Uuid) -> Result<Vec<Subscription>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .subscriptions
            .iter()
            .rev()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    fn expire_subscriptions(&self, today: NaiveDate) -> Result<usize, ApiError> {
        let mut tables = self.tables.write();
        let mut expired = 0;

        for sub in tables.subscriptions.iter_mut() {
            if sub.status == SubscriptionStatus::Active && sub.end_date < today {
                sub.status = SubscriptionStatus::Expired;
                expired += 1;
            }
        }

        Ok(expired)
    }

    fn low_balance_candidates(
        &self,
        threshold: Decimal,
    ) -> Result<Vec<(Account, Wallet)>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .wallets
            .values()
            .filter(|w| w.balance < threshold)
            .filter_map(|w| {
                tables
                    .active_account(&w.user_id)
                    .map(|a| (a.clone(), w.clone()))
            })
            .collect())
    }

    fn wallets_expiring(
        &self,
        after: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Wallet)>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .wallets
            .values()
            .filter(|w| matches!(w.valid_until, Some(d) if d > after && d <= until))
            .filter_map(|w| {
                tables
                    .active_account(&w.user_id)
                    .map(|a| (a.clone(), w.clone()))
            })
            .collect())
    }

    fn subscriptions_ending(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Subscription)>, ApiError> {
        let tables = self.tables.read();
        let mut ending: Vec<(Account, Subscription)> = tables
            .subscriptions
            .iter()
            .filter(|s| s.status == SubscriptionStatus::Active)
            .filter(|s| s.end_date >= from && s.end_date <= until)
            .filter_map(|s| {
                tables
                    .active_account(&s.user_id)
                    .map(|a| (a.clone(), s.clone()))
            })
            .collect();

        ending.sort_by_key(|(_, s)| s.end_date);
        Ok(ending)
    }

    fn record_notification(&self, entry: NewNotification) -> Result<Notification, ApiError> {
        let created = Notification {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            channel: entry.channel,
            kind: entry.kind,
            message: entry.message,
            status: entry.status,
            created_at: Utc::now(),
        };
        self.tables.write().notifications.push(created.clone());

        Ok(created)
    }

    fn claim_daily_alert(
        &self,
        user_id: Uuid,
        kind: NotificationKind,
        day: NaiveDate,
    ) -> Result<bool, ApiError> {
        Ok(self.tables.write().alert_claims.insert((user_id, kind, day)))
    }

    fn notifications_for_user(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, ApiError> {
        let tables = self.tables.read();
        Ok(tables
            .notifications
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

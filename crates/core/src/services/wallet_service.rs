use crate::app_state::AppState;
use crate::services::alert_service::AlertService;
use crate::services::with_store;
use crate::store::{ledger_op, LedgerOutcome, LedgerStore};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::future::Future;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::wallet_dto::{ReconciliationReport, WalletSummary};
use walletgate_primitives::models::entities::enum_types::{EntryType, WalletStatus};
use walletgate_primitives::models::entities::transaction::{NewTransaction, Transaction};
use walletgate_primitives::utility::{max_amount, validate_amount};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

const RETRY_BACKOFF: Duration = Duration::from_millis(25);

pub struct WalletService;

impl WalletService {
    /// Adds `amount` to the wallet. A credit whose reference was already applied is a
    /// no-op that returns the current balance.
    pub async fn credit(
        state: &AppState,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<Decimal, ApiError> {
        let amount = validate_amount(amount)?;
        let reference = reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        let label = reference.clone().unwrap_or_default();

        let result = with_store(state, move |store| {
            Self::apply_credit(store, user_id, amount, reference)
        })
        .await;

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(ApiError::DuplicateReference(_)) => {
                // Lost the race on the reference index; the other credit already landed.
                info!(user_id = %user_id, reference = %label, "wallet.credit: concurrent replay");
                return Self::wallet_summary(state, user_id).await.map(|w| w.balance);
            }
            Err(e) => {
                warn!(user_id = %user_id, amount = %amount, "wallet.credit: failed: {}", e);
                return Err(e);
            }
        };

        let balance = outcome.balance();
        let Some(tx) = outcome.transaction else {
            info!(user_id = %user_id, reference = %label, "wallet.credit: reference already applied");
            return Ok(balance);
        };

        info!(
            user_id = %user_id,
            amount = %tx.amount,
            reference = %label,
            balance = %balance,
            "wallet.credit: committed"
        );

        AlertService::after_ledger_change(state, user_id, balance, EntryType::Credit).await;

        Ok(balance)
    }

    /// Removes `amount` from the wallet, re-checking the balance under the row lock.
    pub async fn debit(
        state: &AppState,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<Decimal, ApiError> {
        let amount = validate_amount(amount)?;
        let reference = reference
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        let outcome = with_store(state, move |store| {
            Self::apply_debit(store, user_id, amount, reference)
        })
        .await
        .map_err(|e| {
            warn!(user_id = %user_id, amount = %amount, "wallet.debit: rejected: {}", e);
            e
        })?;

        info!(
            user_id = %user_id,
            amount = %amount,
            balance = %outcome.balance(),
            "wallet.debit: committed"
        );

        AlertService::after_ledger_change(state, user_id, outcome.balance(), EntryType::Debit)
            .await;

        Ok(outcome.balance())
    }

    pub async fn credit_with_retry(
        state: &AppState,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<Decimal, ApiError> {
        Self::retry_conflicts(state, "wallet.credit", || {
            Self::credit(state, user_id, amount, reference.clone())
        })
        .await
    }

    pub async fn debit_with_retry(
        state: &AppState,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<Decimal, ApiError> {
        Self::retry_conflicts(state, "wallet.debit", || {
            Self::debit(state, user_id, amount, reference.clone())
        })
        .await
    }

    pub async fn wallet_summary(state: &AppState, user_id: Uuid) -> Result<WalletSummary, ApiError> {
        let wallet = with_store(state, move |store| store.find_wallet(user_id))
            .await?
            .ok_or(ApiError::WalletNotFound(user_id))?;

        Ok(WalletSummary::from(wallet))
    }

    pub async fn transaction_history(
        state: &AppState,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Transaction>, ApiError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_HISTORY_LIMIT);

        with_store(state, move |store| store.transactions_for_user(user_id, limit)).await
    }

    /// Compares the stored balance against the ledger's credits minus debits.
    pub async fn reconcile(state: &AppState, user_id: Uuid) -> Result<ReconciliationReport, ApiError> {
        let report = with_store(state, move |store| {
            let wallet = store
                .find_wallet(user_id)?
                .ok_or(ApiError::WalletNotFound(user_id))?;
            let totals = store.ledger_totals(user_id)?;

            Ok(ReconciliationReport {
                user_id,
                balance: wallet.balance,
                totals,
                drift: wallet.balance - totals.net(),
            })
        })
        .await?;

        if !report.is_consistent() {
            warn!(user_id = %user_id, drift = %report.drift, "wallet.reconcile: balance drift detected");
        }

        Ok(report)
    }

    /// Changes wallet status and validity under the row lock. No ledger entry is written.
    pub async fn set_validity(
        state: &AppState,
        user_id: Uuid,
        status: WalletStatus,
        valid_until: Option<NaiveDate>,
    ) -> Result<WalletSummary, ApiError> {
        let outcome = with_store(state, move |store| {
            store.with_locked_wallet(
                user_id,
                ledger_op(move |unit| {
                    unit.write_status(status, valid_until)?;
                    Ok(None)
                }),
            )
        })
        .await?;

        info!(
            user_id = %user_id,
            status = %status,
            valid_until = ?valid_until,
            "wallet.validity: updated"
        );

        Ok(WalletSummary::from(outcome.wallet))
    }

    fn apply_credit(
        store: &dyn LedgerStore,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<LedgerOutcome, ApiError> {
        store.with_locked_wallet(
            user_id,
            ledger_op(move |unit| {
                if let Some(existing) = reference.as_deref() {
                    if unit.find_credit_by_reference(existing)?.is_some() {
                        return Ok(None);
                    }
                }

                let balance = unit
                    .wallet()
                    .balance
                    .checked_add(amount)
                    .filter(|b| *b <= max_amount())
                    .ok_or_else(|| {
                        ApiError::InvalidAmount(format!(
                            "credit of {} would exceed the wallet limit of {}",
                            amount,
                            max_amount()
                        ))
                    })?;
                unit.write_balance(balance)?;

                unit.append_transaction(NewTransaction {
                    user_id,
                    amount,
                    entry_type: EntryType::Credit,
                    reference,
                })
                .map(Some)
            }),
        )
    }

    fn apply_debit(
        store: &dyn LedgerStore,
        user_id: Uuid,
        amount: Decimal,
        reference: Option<String>,
    ) -> Result<LedgerOutcome, ApiError> {
        store.with_locked_wallet(
            user_id,
            ledger_op(move |unit| {
                let current = unit.wallet().balance;
                if current < amount {
                    return Err(ApiError::InsufficientBalance {
                        required: amount,
                        current,
                    });
                }

                unit.write_balance(current - amount)?;

                unit.append_transaction(NewTransaction {
                    user_id,
                    amount,
                    entry_type: EntryType::Debit,
                    reference,
                })
                .map(Some)
            }),
        )
    }

    async fn retry_conflicts<T, F, Fut>(
        state: &AppState,
        operation: &str,
        mut attempt_once: F,
    ) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let max_retries = state.config.ledger.conflict_retries;
        let mut retries = 0;

        loop {
            match attempt_once().await {
                Err(e) if e.is_retryable() && retries < max_retries => {
                    retries += 1;
                    warn!("{}: storage conflict, retry {}/{}", operation, retries, max_retries);
                    tokio::time::sleep(RETRY_BACKOFF * retries).await;
                }
                other => return other,
            }
        }
    }
}

use crate::app_state::AppState;
use crate::services::wallet_service::WalletService;
use crate::services::with_store;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::access_dto::{
    AccessDecision, AccessKind, BalanceCheck, ChargeReceipt, Denial, Grant,
};
use walletgate_primitives::models::entities::{Account, ActionKind, Subscription, Wallet};

pub struct AccessService;

impl AccessService {
    /// Optimistic pre-check for a metered action. The debit that follows a grant
    /// re-validates the balance on its own.
    pub async fn evaluate(
        state: &AppState,
        user_id: Uuid,
        action: ActionKind,
    ) -> Result<AccessDecision, ApiError> {
        let rate = state.config.rates.rate_for(action);
        let today = Utc::now().date_naive();

        let decision = with_store(state, move |store| {
            let account = store
                .find_account(user_id)?
                .ok_or(ApiError::AccountNotFound(user_id))?;
            if !account.is_active() {
                return Ok(AccessDecision::Denial(Denial::AccountBlocked));
            }

            let subscription = store.current_subscription(user_id, today)?;
            let wallet = match subscription {
                Some(_) => None,
                None => store.find_wallet(user_id)?,
            };

            decide(&account, subscription.as_ref(), wallet.as_ref(), rate, today)
        })
        .await?;

        debug!(user_id = %user_id, action = %action, decision = ?decision, "access.evaluate");

        Ok(decision)
    }

    /// Evaluates, then debits the charge on a prepaid grant.
    pub async fn authorize_and_charge(
        state: &AppState,
        user_id: Uuid,
        action: ActionKind,
        reference: Option<String>,
    ) -> Result<ChargeReceipt, ApiError> {
        let grant = Self::evaluate(state, user_id, action)
            .await?
            .into_result()
            .map_err(|e| {
                info!(user_id = %user_id, action = %action, "access.charge: denied: {}", e);
                e
            })?;

        match grant.kind {
            AccessKind::Subscription => Ok(ChargeReceipt {
                access: AccessKind::Subscription,
                charged: Decimal::ZERO,
                balance: None,
            }),
            AccessKind::Prepaid => {
                let balance =
                    WalletService::debit_with_retry(state, user_id, grant.charge, reference)
                        .await?;

                Ok(ChargeReceipt {
                    access: AccessKind::Prepaid,
                    charged: grant.charge,
                    balance: Some(balance),
                })
            }
        }
    }

    /// Snapshot of what the user can currently do.
    pub async fn balance_check(state: &AppState, user_id: Uuid) -> Result<BalanceCheck, ApiError> {
        let rates = state.config.rates.clone();
        let today = Utc::now().date_naive();

        let (account, subscription, wallet) = with_store(state, move |store| {
            let account = store
                .find_account(user_id)?
                .ok_or(ApiError::AccountNotFound(user_id))?;
            let subscription = store.current_subscription(user_id, today)?;
            let wallet = store
                .find_wallet(user_id)?
                .ok_or(ApiError::WalletNotFound(user_id))?;
            Ok((account, subscription, wallet))
        })
        .await?;

        let can_submit = |action: ActionKind| {
            decide(
                &account,
                subscription.as_ref(),
                Some(&wallet),
                rates.rate_for(action),
                today,
            )
            .map(|d| d.is_granted())
            .unwrap_or(false)
        };

        Ok(BalanceCheck {
            balance: wallet.balance,
            wallet_status: wallet.status,
            access: if subscription.is_some() {
                AccessKind::Subscription
            } else {
                AccessKind::Prepaid
            },
            subscription_end: subscription.as_ref().map(|s| s.end_date),
            can_submit_basic: can_submit(ActionKind::Basic),
            can_submit_realtime: can_submit(ActionKind::RealtimeValidation),
            rates: rates.clone(),
        })
    }
}

/// Blocked account, then current subscription, then prepaid balance.
fn decide(
    account: &Account,
    subscription: Option<&Subscription>,
    wallet: Option<&Wallet>,
    rate: Decimal,
    today: NaiveDate,
) -> Result<AccessDecision, ApiError> {
    if !account.is_active() {
        return Ok(AccessDecision::Denial(Denial::AccountBlocked));
    }

    if subscription.is_some_and(|s| s.is_current(today)) {
        return Ok(AccessDecision::Grant(Grant {
            kind: AccessKind::Subscription,
            charge: Decimal::ZERO,
        }));
    }

    let wallet = wallet.ok_or(ApiError::WalletNotFound(account.id))?;

    if !wallet.is_active() {
        return Ok(AccessDecision::Denial(Denial::WalletInactive));
    }

    if wallet.balance < rate {
        return Ok(AccessDecision::Denial(Denial::InsufficientBalance {
            required: rate,
            current: wallet.balance,
        }));
    }

    Ok(AccessDecision::Grant(Grant {
        kind: AccessKind::Prepaid,
        charge: rate,
    }))
}

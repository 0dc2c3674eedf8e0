use crate::app_state::AppState;
use crate::services::with_store;
use tracing::info;
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::{Account, AccountStatus, NewAccount, Wallet};

pub struct AccountService;

impl AccountService {
    /// Creates the account together with its empty wallet.
    pub async fn register(
        state: &AppState,
        new_account: NewAccount,
    ) -> Result<(Account, Wallet), ApiError> {
        let (account, wallet) =
            with_store(state, move |store| store.create_account_with_wallet(new_account)).await?;

        info!(
            user_id = %account.id,
            role = %account.role,
            "account.register: account and wallet created"
        );

        Ok((account, wallet))
    }

    pub async fn find(state: &AppState, user_id: Uuid) -> Result<Account, ApiError> {
        with_store(state, move |store| store.find_account(user_id))
            .await?
            .ok_or(ApiError::AccountNotFound(user_id))
    }

    pub async fn set_status(
        state: &AppState,
        user_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, ApiError> {
        let account =
            with_store(state, move |store| store.set_account_status(user_id, status)).await?;

        info!(user_id = %user_id, status = %status, "account.status: updated");

        Ok(account)
    }
}

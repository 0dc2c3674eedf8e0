use crate::app_state::AppState;
use crate::store::LedgerStore;
use tracing::error;
use walletgate_primitives::error::ApiError;

pub mod access_service;
pub mod account_service;
pub mod alert_service;
pub mod payment_service;
pub mod subscription_service;
pub mod wallet_service;

pub use access_service::AccessService;
pub use account_service::AccountService;
pub use alert_service::AlertService;
pub use payment_service::PaymentService;
pub use subscription_service::SubscriptionService;
pub use wallet_service::WalletService;

/// Runs blocking storage work on the blocking pool.
pub(crate) async fn with_store<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    F: FnOnce(&dyn LedgerStore) -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    let store = state.store.clone();

    tokio::task::spawn_blocking(move || work(store.as_ref()))
        .await
        .map_err(|e| {
            error!("ledger.store: blocking task failed: {}", e);
            ApiError::Internal("Storage task failed".into())
        })?
}

use crate::clients::{HttpNotificationDispatcher, NotificationDispatcher};
use crate::store::LedgerStore;
use eyre::Result;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

pub use walletgate_primitives::models::app_state::app_config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn LedgerStore>,
    pub config: AppConfig,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}

impl AppState {
    /// Wires the HTTP notification dispatcher from configuration.
    pub fn new(store: Arc<dyn LedgerStore>, config: AppConfig) -> Result<Arc<Self>> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;

        let dispatcher = HttpNotificationDispatcher::new(http, &config.notifier_details)?;

        Ok(Self::with_dispatcher(store, config, Arc::new(dispatcher)))
    }

    pub fn with_dispatcher(
        store: Arc<dyn LedgerStore>,
        config: AppConfig,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            config,
            dispatcher,
        })
    }
}

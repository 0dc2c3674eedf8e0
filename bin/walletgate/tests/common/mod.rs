#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;
use walletgate_core::clients::NotificationDispatcher;
use walletgate_core::services::{AccountService, WalletService};
use walletgate_core::store::MemoryLedgerStore;
use walletgate_core::AppState;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::app_state::{
    AlertSettings, AppConfig, LedgerSettings, NotifierInfo, PaymentInfo, RateTable,
};
use walletgate_primitives::models::dtos::alert_dto::{DispatchReceipt, Recipient};
use walletgate_primitives::models::entities::{
    AccountRole, NewAccount, NotificationChannel, NotificationKind,
};

pub const WEBHOOK_SECRET: &str = "test_webhook_secret";
pub const KEY_SECRET: &str = "test_key_secret";

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub user_id: Uuid,
    pub channel: NotificationChannel,
    pub kind: NotificationKind,
    pub message: String,
}

/// Records every dispatch; channels listed in `failing` report a failed delivery.
#[derive(Default)]
pub struct RecordingDispatcher {
    pub sent: Mutex<Vec<SentMessage>>,
    pub failing: Mutex<Vec<NotificationChannel>>,
}

impl RecordingDispatcher {
    pub fn count(&self, user_id: Uuid, kind: NotificationKind) -> usize {
        self.sent
            .lock()
            .iter()
            .filter(|m| m.user_id == user_id && m.kind == kind)
            .count()
    }

    pub fn fail_channel(&self, channel: NotificationChannel) {
        self.failing.lock().push(channel);
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingDispatcher {
    async fn send(
        &self,
        recipient: &Recipient,
        channel: NotificationChannel,
        kind: NotificationKind,
        message: &str,
    ) -> Result<DispatchReceipt, ApiError> {
        self.sent.lock().push(SentMessage {
            user_id: recipient.user_id,
            channel,
            kind,
            message: message.to_string(),
        });

        if self.failing.lock().contains(&channel) {
            return Err(ApiError::Notification("gateway down".into()));
        }

        Ok(DispatchReceipt::sent())
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        rates: RateTable {
            basic: dec!(5),
            realtime_validation: dec!(50),
        },
        alerts: AlertSettings {
            low_balance_threshold: dec!(100),
            expiry_alert_days: 7,
            channels: vec![NotificationChannel::Sms],
            sweep_interval: Duration::from_secs(86400),
        },
        ledger: LedgerSettings {
            lock_timeout: Duration::from_secs(5),
            conflict_retries: 3,
        },
        notifier_details: NotifierInfo {
            notify_api_url: "http://localhost:9/api/v5".into(),
            notify_auth_key: SecretString::new("test_auth_key".into()),
            notify_template_id: "tmpl_test".into(),
            notify_whatsapp_number: "910000000000".into(),
            notify_from_email: "noreply@walletgate.test".into(),
        },
        payment_details: PaymentInfo {
            payment_key_secret: SecretString::new(KEY_SECRET.into()),
            payment_webhook_secret: SecretString::new(WEBHOOK_SECRET.into()),
        },
    }
}

pub struct TestApp {
    pub state: Arc<AppState>,
    pub dispatcher: Arc<RecordingDispatcher>,
}

pub fn create_test_app() -> TestApp {
    create_test_app_with(test_config())
}

pub fn create_test_app_with(config: AppConfig) -> TestApp {
    let dispatcher = Arc::new(RecordingDispatcher::default());
    let store = Arc::new(MemoryLedgerStore::new(config.ledger.lock_timeout));

    let state = AppState::with_dispatcher(store, config, dispatcher.clone());

    TestApp { state, dispatcher }
}

pub async fn create_test_user(state: &AppState, role: AccountRole) -> Uuid {
    let id = Uuid::new_v4();

    AccountService::register(
        state,
        NewAccount {
            id,
            name: "Test User".into(),
            email: format!("user_{}@walletgate.test", id),
            mobile: Some("919876543210".into()),
            role,
        },
    )
    .await
    .expect("Failed to register test user");

    id
}

/// Registers a user and funds the wallet with one credit.
pub async fn create_funded_user(state: &AppState, balance: Decimal) -> Uuid {
    let id = create_test_user(state, AccountRole::Dsa).await;

    if balance > Decimal::ZERO {
        WalletService::credit(state, id, balance, Some(format!("seed_{}", id)))
            .await
            .expect("Failed to fund test wallet");
    }

    id
}

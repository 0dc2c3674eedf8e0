use crate::app_state::AppState;
use crate::services::with_store;
use chrono::{Days, NaiveDate, Utc};
use futures::future::join_all;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::dtos::alert_dto::{DispatchReceipt, Recipient, SweepReport};
use walletgate_primitives::models::entities::{
    Account, DeliveryStatus, EntryType, NewNotification, Notification, NotificationChannel,
    NotificationKind,
};
use walletgate_primitives::utility::sanitize_message;

const DEFAULT_LOG_LIMIT: i64 = 50;

/// Delivery counts for one alert fanned out over the configured channels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    pub sent: usize,
    pub failed: usize,
}

impl Delivery {
    fn add(&mut self, other: Delivery) {
        self.sent += other.sent;
        self.failed += other.failed;
    }
}

pub struct AlertService;

impl AlertService {
    /// Post-commit hook for every ledger mutation. Never fails the caller.
    pub async fn after_ledger_change(
        state: &AppState,
        user_id: Uuid,
        new_balance: Decimal,
        change: EntryType,
    ) {
        let today = Utc::now().date_naive();

        let result = match change {
            EntryType::Debit if new_balance <= state.config.alerts.low_balance_threshold => {
                Self::notify_once(state, user_id, NotificationKind::LowBalance, today).await
            }
            EntryType::Debit => return,
            EntryType::Credit => Self::notify(state, user_id, NotificationKind::PaymentSuccess).await,
        };

        match result {
            Ok(delivery) if delivery.failed > 0 => {
                warn!(user_id = %user_id, failed = delivery.failed, "alerts.ledger: some deliveries failed")
            }
            Ok(_) => {}
            Err(e) => warn!(user_id = %user_id, "alerts.ledger: alert dropped: {}", e),
        }
    }

    /// Scans for low balances and upcoming expiries. Each batch waits for every
    /// delivery, so one failure never stops the rest.
    pub async fn run_sweep(state: &AppState, today: NaiveDate) -> Result<SweepReport, ApiError> {
        let threshold = state.config.alerts.low_balance_threshold;
        let until = today
            .checked_add_days(Days::new(u64::from(state.config.alerts.expiry_alert_days)))
            .ok_or_else(|| ApiError::Internal("Expiry window overflows the calendar".into()))?;

        let (low, expiring, ending) = with_store(state, move |store| {
            Ok((
                store.low_balance_candidates(threshold)?,
                store.wallets_expiring(today, until)?,
                store.subscriptions_ending(today, until)?,
            ))
        })
        .await?;

        let low_balance = unique_accounts(low.into_iter().map(|(a, _)| a));
        let wallet_expiry = unique_accounts(expiring.into_iter().map(|(a, _)| a));
        let subscription_expiry = unique_accounts(ending.into_iter().map(|(a, _)| a));

        let mut report = SweepReport {
            low_balance_users: low_balance.len(),
            wallet_expiry_users: wallet_expiry.len(),
            subscription_expiry_users: subscription_expiry.len(),
            ..SweepReport::default()
        };

        let batches = [
            (NotificationKind::LowBalance, low_balance),
            (NotificationKind::ExpiryAlert, wallet_expiry),
            (NotificationKind::SubscriptionExpiry, subscription_expiry),
        ];

        for (kind, accounts) in batches {
            let delivery = Self::sweep_batch(state, kind, accounts, today).await;
            report.sent += delivery.sent;
            report.failed += delivery.failed;
        }

        info!(
            low_balance = report.low_balance_users,
            wallet_expiry = report.wallet_expiry_users,
            subscription_expiry = report.subscription_expiry_users,
            sent = report.sent,
            failed = report.failed,
            "alerts.sweep: completed"
        );

        Ok(report)
    }

    /// Admin-initiated message on one channel. Falls back to the default text.
    pub async fn send_manual(
        state: &AppState,
        user_id: Uuid,
        channel: NotificationChannel,
        message: Option<String>,
    ) -> Result<DispatchReceipt, ApiError> {
        let account = Self::load_account(state, user_id).await?;
        let kind = NotificationKind::Manual;
        let message = Self::render(&account, kind, message.as_deref());

        let status = Self::deliver(state, &Recipient::from(&account), channel, kind, &message).await;

        Ok(match status {
            DeliveryStatus::Sent => DispatchReceipt::sent(),
            DeliveryStatus::Failed => DispatchReceipt::failed(),
        })
    }

    pub async fn notification_history(
        state: &AppState,
        user_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Notification>, ApiError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LOG_LIMIT);

        with_store(state, move |store| store.notifications_for_user(user_id, limit)).await
    }

    /// Sends `kind` unless the user's slot for that kind is already taken today.
    pub async fn notify_once(
        state: &AppState,
        user_id: Uuid,
        kind: NotificationKind,
        today: NaiveDate,
    ) -> Result<Delivery, ApiError> {
        let account = Self::load_account(state, user_id).await?;
        Self::send_once(state, &account, kind, today).await
    }

    async fn notify(
        state: &AppState,
        user_id: Uuid,
        kind: NotificationKind,
    ) -> Result<Delivery, ApiError> {
        let account = Self::load_account(state, user_id).await?;
        Ok(Self::fan_out(state, &account, kind).await)
    }

    async fn sweep_batch(
        state: &AppState,
        kind: NotificationKind,
        accounts: Vec<Account>,
        today: NaiveDate,
    ) -> Delivery {
        let jobs = accounts
            .iter()
            .map(|account| Self::send_once(state, account, kind, today));

        let mut total = Delivery::default();
        for (account, outcome) in accounts.iter().zip(join_all(jobs).await) {
            match outcome {
                Ok(delivery) => total.add(delivery),
                Err(e) => {
                    warn!(user_id = %account.id, kind = %kind, "alerts.sweep: skipped: {}", e);
                    total.failed += 1;
                }
            }
        }

        total
    }

    /// Claims the (user, kind, day) slot first; only the winner dispatches.
    async fn send_once(
        state: &AppState,
        account: &Account,
        kind: NotificationKind,
        today: NaiveDate,
    ) -> Result<Delivery, ApiError> {
        let user_id = account.id;
        let claimed =
            with_store(state, move |store| store.claim_daily_alert(user_id, kind, today)).await?;

        if !claimed {
            debug!(user_id = %user_id, kind = %kind, "alerts.dedup: already notified today");
            return Ok(Delivery::default());
        }

        Ok(Self::fan_out(state, account, kind).await)
    }

    async fn fan_out(state: &AppState, account: &Account, kind: NotificationKind) -> Delivery {
        let recipient = Recipient::from(account);
        let message = Self::render(account, kind, None);

        let deliveries = state
            .config
            .alerts
            .channels
            .iter()
            .map(|channel| Self::deliver(state, &recipient, *channel, kind, &message));

        let mut delivery = Delivery::default();
        for status in join_all(deliveries).await {
            match status {
                DeliveryStatus::Sent => delivery.sent += 1,
                DeliveryStatus::Failed => delivery.failed += 1,
            }
        }

        delivery
    }

    /// One dispatch attempt, always written to the notification log.
    async fn deliver(
        state: &AppState,
        recipient: &Recipient,
        channel: NotificationChannel,
        kind: NotificationKind,
        message: &str,
    ) -> DeliveryStatus {
        let status = match state
            .dispatcher
            .send(recipient, channel, kind, message)
            .await
        {
            Ok(receipt) => receipt.status,
            Err(e) => {
                warn!(
                    user_id = %recipient.user_id,
                    channel = %channel,
                    kind = %kind,
                    "alerts.dispatch: failed: {}",
                    e
                );
                DeliveryStatus::Failed
            }
        };

        let entry = NewNotification {
            user_id: recipient.user_id,
            channel,
            kind,
            message: message.to_string(),
            status,
        };

        if let Err(e) = with_store(state, move |store| store.record_notification(entry)).await {
            warn!(user_id = %recipient.user_id, "alerts.log: failed to record notification: {}", e);
        }

        status
    }

    async fn load_account(state: &AppState, user_id: Uuid) -> Result<Account, ApiError> {
        with_store(state, move |store| store.find_account(user_id))
            .await?
            .ok_or(ApiError::AccountNotFound(user_id))
    }

    fn render(account: &Account, kind: NotificationKind, custom: Option<&str>) -> String {
        let raw = custom
            .filter(|m| !m.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| kind.default_message(&account.name));

        sanitize_message(&raw)
    }
}

fn unique_accounts(accounts: impl Iterator<Item = Account>) -> Vec<Account> {
    let mut seen = HashSet::new();
    accounts.filter(|a| seen.insert(a.id)).collect()
}

use crate::app_state::AppState;
use crate::services::with_store;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::{NewSubscription, Subscription, SubscriptionStatus};
use walletgate_primitives::utility::validate_amount;

pub struct SubscriptionService;

impl SubscriptionService {
    /// Starts an active plan covering `[today, today + duration_days]`.
    pub async fn activate(
        state: &AppState,
        user_id: Uuid,
        plan_name: &str,
        amount: Decimal,
        duration_days: u32,
    ) -> Result<Subscription, ApiError> {
        let amount = validate_amount(amount)?;
        let plan_name = plan_name.trim().to_string();
        if plan_name.is_empty() {
            return Err(ApiError::Payment("Plan name is required".into()));
        }
        if duration_days == 0 {
            return Err(ApiError::Payment("Subscription duration must be at least one day".into()));
        }

        let start_date = Utc::now().date_naive();
        let end_date = start_date
            .checked_add_days(Days::new(u64::from(duration_days)))
            .ok_or_else(|| ApiError::Payment("Subscription duration is too long".into()))?;

        let subscription = with_store(state, move |store| {
            store
                .find_account(user_id)?
                .ok_or(ApiError::AccountNotFound(user_id))?;

            store.insert_subscription(NewSubscription {
                user_id,
                plan_name,
                amount,
                start_date,
                end_date,
                status: SubscriptionStatus::Active,
            })
        })
        .await?;

        info!(
            user_id = %user_id,
            plan = %subscription.plan_name,
            end_date = %subscription.end_date,
            "subscription.activate: active"
        );

        Ok(subscription)
    }

    pub async fn current(state: &AppState, user_id: Uuid) -> Result<Option<Subscription>, ApiError> {
        let today = Utc::now().date_naive();
        with_store(state, move |store| store.current_subscription(user_id, today)).await
    }

    pub async fn history(state: &AppState, user_id: Uuid) -> Result<Vec<Subscription>, ApiError> {
        with_store(state, move |store| store.subscriptions_for_user(user_id)).await
    }

    /// Housekeeping only; access decisions compare end dates directly.
    pub async fn expire_lapsed(state: &AppState, today: NaiveDate) -> Result<usize, ApiError> {
        let expired = with_store(state, move |store| store.expire_subscriptions(today)).await?;

        if expired > 0 {
            info!(count = expired, "subscription.expire: marked lapsed subscriptions expired");
        }

        Ok(expired)
    }
}

use chrono::NaiveDate;
use diesel::prelude::*;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::account::Account;
use walletgate_primitives::models::entities::enum_types::{AccountStatus, SubscriptionStatus};
use walletgate_primitives::models::entities::subscription::{NewSubscription, Subscription};
use walletgate_primitives::schema::{accounts, subscriptions};
use uuid::Uuid;

pub struct SubscriptionRepository;

impl SubscriptionRepository {
    pub fn create(
        conn: &mut PgConnection,
        new_sub: &NewSubscription,
    ) -> Result<Subscription, ApiError> {
        diesel::insert_into(subscriptions::table)
            .values(new_sub)
            .returning(Subscription::as_returning())
            .get_result::<Subscription>(conn)
            .map_err(ApiError::from)
    }

    /// Most recent active row that has not passed its end date.
    pub fn find_current(
        conn: &mut PgConnection,
        user_id: Uuid,
        today: NaiveDate,
    ) -> Result<Option<Subscription>, ApiError> {
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active))
            .filter(subscriptions::end_date.ge(today))
            .order((subscriptions::end_date.desc(), subscriptions::created_at.desc()))
            .select(Subscription::as_select())
            .first::<Subscription>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    pub fn find_all_by_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Subscription>, ApiError> {
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .order(subscriptions::created_at.desc())
            .select(Subscription::as_select())
            .load::<Subscription>(conn)
            .map_err(ApiError::from)
    }

    pub fn expire_lapsed(conn: &mut PgConnection, today: NaiveDate) -> Result<usize, ApiError> {
        diesel::update(subscriptions::table)
            .filter(subscriptions::status.eq(SubscriptionStatus::Active))
            .filter(subscriptions::end_date.lt(today))
            .set(subscriptions::status.eq(SubscriptionStatus::Expired))
            .execute(conn)
            .map_err(ApiError::from)
    }

    /// Current subscriptions of active accounts ending in `[from, until]`.
    pub fn find_ending_between(
        conn: &mut PgConnection,
        from: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Subscription)>, ApiError> {
        accounts::table
            .inner_join(subscriptions::table)
            .filter(accounts::status.eq(AccountStatus::Active))
            .filter(subscriptions::status.eq(SubscriptionStatus::Active))
            .filter(subscriptions::end_date.ge(from))
            .filter(subscriptions::end_date.le(until))
            .order(subscriptions::end_date.asc())
            .select((Account::as_select(), Subscription::as_select()))
            .load::<(Account, Subscription)>(conn)
            .map_err(ApiError::from)
    }
}

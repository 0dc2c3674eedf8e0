use crate::models::entities::enum_types::SubscriptionStatus;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(belongs_to(crate::models::entities::account::Account, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan_name: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// A subscription grants access while it is active and has not run past its end date.
    pub fn is_current(&self, today: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date >= today
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::subscriptions)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub plan_name: String,
    pub amount: Decimal,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub status: SubscriptionStatus,
}

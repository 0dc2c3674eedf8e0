use crate::models::entities::enum_types::{DeliveryStatus, NotificationChannel, NotificationKind};
use chrono::{DateTime, Utc};
use diesel::{Associations, Identifiable, Insertable, Queryable, Selectable};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Associations, Serialize)]
#[diesel(table_name = crate::schema::notifications)]
#[diesel(belongs_to(crate::models::entities::account::Account, foreign_key = user_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct Notification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub channel: NotificationChannel,
    pub kind: NotificationKind,
    pub message: String,
    pub status: DeliveryStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::notifications)]
pub struct NewNotification {
    pub user_id: Uuid,
    pub channel: NotificationChannel,
    pub kind: NotificationKind,
    pub message: String,
    pub status: DeliveryStatus,
}

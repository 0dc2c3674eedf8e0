use chrono::NaiveDate;
use diesel::prelude::*;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::enum_types::NotificationKind;
use walletgate_primitives::models::entities::notification::{NewNotification, Notification};
use walletgate_primitives::schema::{notification_claims, notifications};
use uuid::Uuid;

pub struct NotificationRepository;

impl NotificationRepository {
    pub fn create(
        conn: &mut PgConnection,
        new_log: &NewNotification,
    ) -> Result<Notification, ApiError> {
        diesel::insert_into(notifications::table)
            .values(new_log)
            .returning(Notification::as_returning())
            .get_result::<Notification>(conn)
            .map_err(ApiError::from)
    }

    /// Inserts the (user, kind, day) claim row. Returns `false` when another
    /// caller already holds it.
    pub fn claim_for_day(
        conn: &mut PgConnection,
        user_id: Uuid,
        kind: NotificationKind,
        day: NaiveDate,
    ) -> Result<bool, ApiError> {
        diesel::insert_into(notification_claims::table)
            .values((
                notification_claims::user_id.eq(user_id),
                notification_claims::kind.eq(kind),
                notification_claims::day.eq(day),
            ))
            .on_conflict_do_nothing()
            .execute(conn)
            .map(|inserted| inserted == 1)
            .map_err(ApiError::from)
    }

    pub fn find_recent_by_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Notification>, ApiError> {
        notifications::table
            .filter(notifications::user_id.eq(user_id))
            .order(notifications::created_at.desc())
            .limit(limit)
            .select(Notification::as_select())
            .load::<Notification>(conn)
            .map_err(ApiError::from)
    }
}

use chrono::Utc;
use diesel::prelude::*;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::account::{Account, NewAccount};
use walletgate_primitives::models::entities::enum_types::AccountStatus;
use walletgate_primitives::schema::accounts;
use uuid::Uuid;

pub struct AccountRepository;

impl AccountRepository {
    pub fn find_by_id(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Account>, ApiError> {
        accounts::table
            .find(user_id)
            .select(Account::as_select())
            .first::<Account>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    pub fn create(conn: &mut PgConnection, new_account: &NewAccount) -> Result<Account, ApiError> {
        diesel::insert_into(accounts::table)
            .values(new_account)
            .returning(Account::as_returning())
            .get_result::<Account>(conn)
            .map_err(ApiError::from)
    }

    pub fn update_status(
        conn: &mut PgConnection,
        user_id: Uuid,
        status: AccountStatus,
    ) -> Result<Account, ApiError> {
        diesel::update(accounts::table.find(user_id))
            .set((
                accounts::status.eq(status),
                accounts::updated_at.eq(Utc::now()),
            ))
            .returning(Account::as_returning())
            .get_result::<Account>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ApiError::AccountNotFound(user_id),
                other => ApiError::from(other),
            })
    }
}

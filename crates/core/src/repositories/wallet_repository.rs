use chrono::{NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::account::Account;
use walletgate_primitives::models::entities::enum_types::{AccountStatus, WalletStatus};
use walletgate_primitives::models::entities::wallet::{NewWallet, Wallet};
use walletgate_primitives::schema::{accounts, wallets};
use uuid::Uuid;

pub struct WalletRepository;

impl WalletRepository {
    pub fn find_by_user(conn: &mut PgConnection, user_id: Uuid) -> Result<Option<Wallet>, ApiError> {
        wallets::table
            .filter(wallets::user_id.eq(user_id))
            .select(Wallet::as_select())
            .first::<Wallet>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    /// Selects the wallet row `FOR UPDATE`; only valid inside a transaction.
    pub fn find_by_user_with_lock(conn: &mut PgConnection, user_id: Uuid) -> Result<Wallet, ApiError> {
        wallets::table
            .filter(wallets::user_id.eq(user_id))
            .select(Wallet::as_select())
            .for_update()
            .first::<Wallet>(conn)
            .map_err(|e| match e {
                diesel::result::Error::NotFound => ApiError::WalletNotFound(user_id),
                other => ApiError::from(other),
            })
    }

    pub fn create(conn: &mut PgConnection, new_wallet: &NewWallet) -> Result<Wallet, ApiError> {
        diesel::insert_into(wallets::table)
            .values(new_wallet)
            .returning(Wallet::as_returning())
            .get_result::<Wallet>(conn)
            .map_err(ApiError::from)
    }

    pub fn set_balance(
        conn: &mut PgConnection,
        wallet_id: Uuid,
        balance: Decimal,
    ) -> Result<Wallet, ApiError> {
        diesel::update(wallets::table.find(wallet_id))
            .set((
                wallets::balance.eq(balance),
                wallets::updated_at.eq(Utc::now()),
            ))
            .returning(Wallet::as_returning())
            .get_result::<Wallet>(conn)
            .map_err(ApiError::from)
    }

    pub fn set_validity(
        conn: &mut PgConnection,
        wallet_id: Uuid,
        status: WalletStatus,
        valid_until: Option<NaiveDate>,
    ) -> Result<Wallet, ApiError> {
        diesel::update(wallets::table.find(wallet_id))
            .set((
                wallets::status.eq(status),
                wallets::valid_until.eq(valid_until),
                wallets::updated_at.eq(Utc::now()),
            ))
            .returning(Wallet::as_returning())
            .get_result::<Wallet>(conn)
            .map_err(ApiError::from)
    }

    pub fn find_low_balance(
        conn: &mut PgConnection,
        threshold: Decimal,
    ) -> Result<Vec<(Account, Wallet)>, ApiError> {
        accounts::table
            .inner_join(wallets::table)
            .filter(accounts::status.eq(AccountStatus::Active))
            .filter(wallets::balance.lt(threshold))
            .select((Account::as_select(), Wallet::as_select()))
            .load::<(Account, Wallet)>(conn)
            .map_err(ApiError::from)
    }

    /// Wallets whose validity ends in `(after, until]`.
    pub fn find_expiring(
        conn: &mut PgConnection,
        after: NaiveDate,
        until: NaiveDate,
    ) -> Result<Vec<(Account, Wallet)>, ApiError> {
        accounts::table
            .inner_join(wallets::table)
            .filter(accounts::status.eq(AccountStatus::Active))
            .filter(wallets::valid_until.gt(after))
            .filter(wallets::valid_until.le(until))
            .select((Account::as_select(), Wallet::as_select()))
            .load::<(Account, Wallet)>(conn)
            .map_err(ApiError::from)
    }
}

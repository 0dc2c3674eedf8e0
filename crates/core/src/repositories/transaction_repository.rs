use diesel::dsl::sum;
use diesel::prelude::*;
use rust_decimal::Decimal;
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::entities::enum_types::EntryType;
use walletgate_primitives::models::entities::transaction::{NewTransaction, Transaction};
use walletgate_primitives::models::dtos::wallet_dto::LedgerTotals;
use walletgate_primitives::schema::transactions;
use uuid::Uuid;

pub struct TransactionRepository;

impl TransactionRepository {
    pub fn create(conn: &mut PgConnection, new_tx: &NewTransaction) -> Result<Transaction, ApiError> {
        diesel::insert_into(transactions::table)
            .values(new_tx)
            .returning(Transaction::as_returning())
            .get_result::<Transaction>(conn)
            .map_err(ApiError::from)
    }

    pub fn find_credit_by_reference(
        conn: &mut PgConnection,
        reference: &str,
    ) -> Result<Option<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::entry_type.eq(EntryType::Credit))
            .filter(transactions::reference.eq(reference))
            .select(Transaction::as_select())
            .first::<Transaction>(conn)
            .optional()
            .map_err(ApiError::from)
    }

    pub fn find_recent_by_user(
        conn: &mut PgConnection,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Transaction>, ApiError> {
        transactions::table
            .filter(transactions::user_id.eq(user_id))
            .order(transactions::created_at.desc())
            .limit(limit)
            .select(Transaction::as_select())
            .load::<Transaction>(conn)
            .map_err(ApiError::from)
    }

    pub fn totals_for_user(conn: &mut PgConnection, user_id: Uuid) -> Result<LedgerTotals, ApiError> {
        Ok(LedgerTotals {
            credits: Self::sum_by_type(conn, user_id, EntryType::Credit)?,
            debits: Self::sum_by_type(conn, user_id, EntryType::Debit)?,
        })
    }

    fn sum_by_type(
        conn: &mut PgConnection,
        user_id: Uuid,
        entry_type: EntryType,
    ) -> Result<Decimal, ApiError> {
        let total = transactions::table
            .filter(transactions::user_id.eq(user_id))
            .filter(transactions::entry_type.eq(entry_type))
            .select(sum(transactions::amount))
            .first::<Option<Decimal>>(conn)
            .map_err(ApiError::from)?;

        Ok(total.unwrap_or(Decimal::ZERO))
    }
}

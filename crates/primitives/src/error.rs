use diesel::r2d2;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use http::StatusCode;
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

#[derive(Debug)]
pub enum ApiError {
    WalletNotFound(Uuid),
    AccountNotFound(Uuid),
    InsufficientBalance { required: Decimal, current: Decimal },
    AccountBlocked,
    WalletInactive,
    InvalidAmount(String),
    DuplicateReference(String),
    StorageConflict(String),
    Database(DieselError),
    DatabaseConnection(String),
    Notification(String),
    Payment(String),
    Internal(String),
}

impl ApiError {
    /// Lock timeouts, deadlocks and serialization failures can succeed when tried again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ApiError::StorageConflict(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::WalletNotFound(_) | ApiError::AccountNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InsufficientBalance { .. } => StatusCode::PAYMENT_REQUIRED,
            ApiError::AccountBlocked | ApiError::WalletInactive => StatusCode::FORBIDDEN,
            ApiError::InvalidAmount(_) | ApiError::Payment(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateReference(_) | ApiError::StorageConflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_)
            | ApiError::DatabaseConnection(_)
            | ApiError::Notification(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the end user. Storage and internal failures stay generic.
    pub fn public_message(&self) -> String {
        match self {
            ApiError::WalletNotFound(_) => "Wallet not found".to_string(),
            ApiError::AccountNotFound(_) => "Account not found".to_string(),
            ApiError::InsufficientBalance { required, current } => format!(
                "Insufficient balance. Please recharge your wallet. Required: {}, current: {}",
                required, current
            ),
            ApiError::AccountBlocked => "Account is blocked. Contact support.".to_string(),
            ApiError::WalletInactive => "Wallet is inactive. Please contact support.".to_string(),
            ApiError::InvalidAmount(msg) => format!("Invalid amount: {}", msg),
            ApiError::DuplicateReference(_) => "Transaction already processed".to_string(),
            ApiError::StorageConflict(_) => {
                "The wallet is busy. Please retry shortly.".to_string()
            }
            ApiError::Payment(msg) => format!("Payment error: {}", msg),
            ApiError::Database(_)
            | ApiError::DatabaseConnection(_)
            | ApiError::Notification(_)
            | ApiError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::WalletNotFound(id) => write!(f, "Wallet not found for user {}", id),
            ApiError::AccountNotFound(id) => write!(f, "Account not found: {}", id),
            ApiError::InsufficientBalance { required, current } => write!(
                f,
                "Insufficient balance: required {}, current {}",
                required, current
            ),
            ApiError::AccountBlocked => write!(f, "Account is blocked"),
            ApiError::WalletInactive => write!(f, "Wallet is inactive"),
            ApiError::InvalidAmount(e) => write!(f, "Invalid amount: {}", e),
            ApiError::DuplicateReference(r) => write!(f, "Duplicate reference: {}", r),
            ApiError::StorageConflict(e) => write!(f, "Storage conflict: {}", e),
            ApiError::Database(e) => write!(f, "Database error: {}", e),
            ApiError::DatabaseConnection(e) => write!(f, "Database connection error: {}", e),
            ApiError::Notification(e) => write!(f, "Notification error: {}", e),
            ApiError::Payment(e) => write!(f, "Payment error: {}", e),
            ApiError::Internal(e) => write!(f, "Internal error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Database(e) => Some(e),
            _ => None,
        }
    }
}

impl From<r2d2::PoolError> for ApiError {
    fn from(err: r2d2::PoolError) -> Self {
        ApiError::DatabaseConnection(err.to_string())
    }
}

impl From<DieselError> for ApiError {
    fn from(err: DieselError) -> Self {
        match &err {
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
                ApiError::StorageConflict(info.message().to_string())
            }
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
                if info.constraint_name() == Some(CREDIT_REFERENCE_INDEX) =>
            {
                ApiError::DuplicateReference(info.message().to_string())
            }
            DieselError::DatabaseError(_, info) if is_lock_failure(info.message()) => {
                ApiError::StorageConflict(info.message().to_string())
            }
            _ => ApiError::Database(err),
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Notification(err.to_string())
    }
}

impl From<rust_decimal::Error> for ApiError {
    fn from(err: rust_decimal::Error) -> Self {
        ApiError::InvalidAmount(err.to_string())
    }
}

impl From<ApiError> for (StatusCode, String) {
    fn from(err: ApiError) -> Self {
        (err.status_code(), err.public_message())
    }
}

/// Name of the partial unique index guarding credit references.
pub const CREDIT_REFERENCE_INDEX: &str = "transactions_credit_reference_key";

// Postgres reports lock_timeout (55P03) and deadlocks (40P01) without a dedicated diesel kind.
fn is_lock_failure(message: &str) -> bool {
    message.contains("lock timeout")
        || message.contains("could not obtain lock")
        || message.contains("deadlock detected")
}

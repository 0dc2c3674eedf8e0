use crate::models::entities::account::Account;
use crate::models::entities::enum_types::DeliveryStatus;
use serde::Serialize;
use uuid::Uuid;

/// Contact details handed to the notification dispatcher.
#[derive(Debug, Clone, Serialize)]
pub struct Recipient {
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub mobile: Option<String>,
}

impl From<&Account> for Recipient {
    fn from(account: &Account) -> Self {
        Self {
            user_id: account.id,
            name: account.name.clone(),
            email: account.email.clone(),
            mobile: account.mobile.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DispatchReceipt {
    pub success: bool,
    pub status: DeliveryStatus,
}

impl DispatchReceipt {
    pub fn sent() -> Self {
        Self {
            success: true,
            status: DeliveryStatus::Sent,
        }
    }

    pub fn failed() -> Self {
        Self {
            success: false,
            status: DeliveryStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    pub low_balance_users: usize,
    pub wallet_expiry_users: usize,
    pub subscription_expiry_users: usize,
    pub sent: usize,
    pub failed: usize,
}

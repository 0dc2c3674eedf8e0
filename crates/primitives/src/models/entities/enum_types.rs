use crate::error::ApiError;
use diesel_derive_enum::DbEnum;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::AccountStatus"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccountStatus {
    Active,
    Blocked,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::AccountRole"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AccountRole {
    Dsa,
    Nbfc,
    Coop,
    Admin,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::WalletStatus"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WalletStatus {
    Active,
    Expired,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::EntryType"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EntryType {
    Credit,
    Debit,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::SubscriptionStatus"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::NotificationChannel"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationChannel {
    Sms,
    Whatsapp,
    Email,
}

impl NotificationChannel {
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let normalized = input.trim().to_lowercase();

        NotificationChannel::from_str(&normalized)
            .map_err(|_| ApiError::Notification(format!("Invalid notification channel: {}", input)))
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::NotificationKind"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationKind {
    LowBalance,
    PaymentSuccess,
    ExpiryAlert,
    SubscriptionExpiry,
    Manual,
}

impl NotificationKind {
    /// Text used when the caller supplies no message of its own.
    pub fn default_message(&self, name: &str) -> String {
        match self {
            NotificationKind::LowBalance => format!(
                "Hi {}, your wallet balance is running low. Please recharge to continue using our services.",
                name
            ),
            NotificationKind::PaymentSuccess => format!(
                "Hi {}, your payment has been successfully processed and added to your wallet.",
                name
            ),
            NotificationKind::ExpiryAlert => format!(
                "Hi {}, your wallet validity is expiring soon. Please recharge to avoid service interruption.",
                name
            ),
            NotificationKind::SubscriptionExpiry => format!(
                "Hi {}, your subscription is expiring soon. Please renew to avoid service interruption.",
                name
            ),
            NotificationKind::Manual => format!("Hi {}, this is a notification from WalletGate.", name),
        }
    }

    pub fn email_subject(&self) -> &'static str {
        match self {
            NotificationKind::PaymentSuccess => "Payment Confirmation",
            NotificationKind::LowBalance => "Low Balance Alert",
            NotificationKind::ExpiryAlert | NotificationKind::SubscriptionExpiry => "Expiry Reminder",
            NotificationKind::Manual => "WalletGate Notification",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, DbEnum, Display, EnumString,
)]
#[ExistingTypePath = "crate::schema::sql_types::DeliveryStatus"]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Metered actions a user can pay for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ActionKind {
    Basic,
    RealtimeValidation,
}

impl ActionKind {
    pub const ALL: [ActionKind; 2] = [ActionKind::Basic, ActionKind::RealtimeValidation];

    pub fn parse(input: &str) -> Result<Self, ApiError> {
        ActionKind::from_str(input.trim())
            .map_err(|_| ApiError::Internal(format!("Unsupported action kind: {}", input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channels_parse_case_insensitively() {
        assert_eq!(NotificationChannel::parse(" SMS ").unwrap(), NotificationChannel::Sms);
        assert_eq!(
            NotificationChannel::parse("WhatsApp").unwrap(),
            NotificationChannel::Whatsapp
        );
        assert!(NotificationChannel::parse("pigeon").is_err());
    }

    #[test]
    fn action_kinds_use_snake_case_names() {
        assert_eq!(ActionKind::RealtimeValidation.to_string(), "realtime_validation");
        assert_eq!(ActionKind::parse("basic").unwrap(), ActionKind::Basic);
    }

    #[test]
    fn default_messages_are_personalised() {
        let msg = NotificationKind::LowBalance.default_message("Asha");
        assert!(msg.starts_with("Hi Asha,"));
        assert_eq!(NotificationKind::LowBalance.email_subject(), "Low Balance Alert");
    }
}

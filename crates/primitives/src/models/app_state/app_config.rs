use crate::models::app_state::alert_settings::AlertSettings;
use crate::models::app_state::ledger_settings::LedgerSettings;
use crate::models::app_state::notifier_details::NotifierInfo;
use crate::models::app_state::payment_details::PaymentInfo;
use crate::models::app_state::rate_table::RateTable;
use eyre::{eyre, Report};
use std::env;
use std::fmt::Display;
use std::str::FromStr;

/// Process-wide configuration, loaded once at startup and never mutated.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub rates: RateTable,

    pub alerts: AlertSettings,

    pub ledger: LedgerSettings,

    pub notifier_details: NotifierInfo,

    pub payment_details: PaymentInfo,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Report> {
        Ok(Self {
            rates: RateTable::new()?,

            alerts: AlertSettings::new()?,

            ledger: LedgerSettings::new()?,

            notifier_details: NotifierInfo::new()?,

            payment_details: PaymentInfo::new()?,
        })
    }
}

/// Reads `key` from the environment, falling back to `default`, and parses it.
pub(crate) fn parse_env<T>(key: &str, default: &str) -> Result<T, Report>
where
    T: FromStr,
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());

    raw.trim()
        .parse::<T>()
        .map_err(|e| eyre!("Invalid value for {} ({:?}): {}", key, raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::app_state::alert_settings::parse_channels;
    use crate::models::entities::enum_types::{ActionKind, NotificationChannel};
    use rust_decimal_macros::dec;
    use serial_test::serial;

    const KEYS: [&str; 9] = [
        "BASIC_FORM_RATE",
        "REALTIME_VALIDATION_RATE",
        "LOW_BALANCE_THRESHOLD",
        "EXPIRY_ALERT_DAYS",
        "ALERT_CHANNELS",
        "LEDGER_LOCK_TIMEOUT_MS",
        "NOTIFY_AUTH_KEY",
        "PAYMENT_KEY_SECRET",
        "PAYMENT_WEBHOOK_SECRET",
    ];

    fn reset_env() {
        for key in KEYS {
            env::remove_var(key);
        }
        env::set_var("NOTIFY_AUTH_KEY", "test-auth-key");
        env::set_var("PAYMENT_KEY_SECRET", "test-key-secret");
        env::set_var("PAYMENT_WEBHOOK_SECRET", "test-webhook-secret");
    }

    #[test]
    #[serial]
    fn defaults_are_applied() {
        reset_env();

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.rates.rate_for(ActionKind::Basic), dec!(5));
        assert_eq!(config.rates.rate_for(ActionKind::RealtimeValidation), dec!(50));
        assert_eq!(config.alerts.low_balance_threshold, dec!(100));
        assert_eq!(config.alerts.expiry_alert_days, 7);
        assert_eq!(
            config.alerts.channels,
            vec![NotificationChannel::Sms, NotificationChannel::Email]
        );
        assert_eq!(config.ledger.lock_timeout.as_millis(), 5000);
    }

    #[test]
    #[serial]
    fn malformed_rate_fails_fast() {
        reset_env();
        env::set_var("BASIC_FORM_RATE", "five");

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("BASIC_FORM_RATE"));

        env::remove_var("BASIC_FORM_RATE");
    }

    #[test]
    #[serial]
    fn non_positive_rate_is_rejected() {
        reset_env();
        env::set_var("REALTIME_VALIDATION_RATE", "0");

        assert!(AppConfig::from_env().is_err());

        env::remove_var("REALTIME_VALIDATION_RATE");
    }

    #[test]
    #[serial]
    fn missing_secret_is_rejected() {
        reset_env();
        env::remove_var("PAYMENT_WEBHOOK_SECRET");

        let err = AppConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("PAYMENT_WEBHOOK_SECRET"));
    }

    #[test]
    fn channel_list_is_deduplicated_and_validated() {
        let channels = parse_channels("sms, email ,sms").unwrap();
        assert_eq!(channels, vec![NotificationChannel::Sms, NotificationChannel::Email]);

        assert!(parse_channels(" , ").is_err());
        assert!(parse_channels("sms,fax").is_err());
    }
}

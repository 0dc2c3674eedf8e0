use crate::models::app_state::app_config::parse_env;
use crate::models::entities::enum_types::NotificationChannel;
use eyre::{eyre, Report};
use rust_decimal::Decimal;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub low_balance_threshold: Decimal,
    pub expiry_alert_days: u32,
    pub channels: Vec<NotificationChannel>,
    pub sweep_interval: Duration,
}

impl AlertSettings {
    pub fn new() -> Result<Self, Report> {
        let low_balance_threshold: Decimal = parse_env("LOW_BALANCE_THRESHOLD", "100")?;
        if low_balance_threshold < Decimal::ZERO {
            return Err(eyre!("LOW_BALANCE_THRESHOLD must not be negative"));
        }

        let expiry_alert_days: u32 = parse_env("EXPIRY_ALERT_DAYS", "7")?;
        if expiry_alert_days == 0 {
            return Err(eyre!("EXPIRY_ALERT_DAYS must be at least 1"));
        }

        let sweep_secs: u64 = parse_env("ALERT_SWEEP_INTERVAL_SECS", "86400")?;
        if sweep_secs == 0 {
            return Err(eyre!("ALERT_SWEEP_INTERVAL_SECS must be at least 1"));
        }

        let channels = parse_channels(
            &env::var("ALERT_CHANNELS").unwrap_or_else(|_| "sms,email".into()),
        )?;

        Ok(Self {
            low_balance_threshold,
            expiry_alert_days,
            channels,
            sweep_interval: Duration::from_secs(sweep_secs),
        })
    }
}

pub fn parse_channels(raw: &str) -> Result<Vec<NotificationChannel>, Report> {
    let mut channels = Vec::new();

    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let channel = NotificationChannel::parse(part)
            .map_err(|e| eyre!("ALERT_CHANNELS: {}", e))?;
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }

    if channels.is_empty() {
        return Err(eyre!("ALERT_CHANNELS must name at least one channel"));
    }

    Ok(channels)
}

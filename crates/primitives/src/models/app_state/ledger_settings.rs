use crate::models::app_state::app_config::parse_env;
use eyre::{eyre, Report};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct LedgerSettings {
    /// Upper bound on waiting for a wallet row lock.
    pub lock_timeout: Duration,
    pub conflict_retries: u32,
}

impl LedgerSettings {
    pub fn new() -> Result<Self, Report> {
        let timeout_ms: u64 = parse_env("LEDGER_LOCK_TIMEOUT_MS", "5000")?;
        if timeout_ms == 0 {
            return Err(eyre!("LEDGER_LOCK_TIMEOUT_MS must be at least 1"));
        }

        Ok(Self {
            lock_timeout: Duration::from_millis(timeout_ms),
            conflict_retries: parse_env("LEDGER_CONFLICT_RETRIES", "3")?,
        })
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            conflict_retries: 3,
        }
    }
}

use crate::models::entities::enum_types::ActionKind;
use crate::models::app_state::app_config::parse_env;
use eyre::{eyre, Report};
use rust_decimal::Decimal;
use serde::Serialize;

/// Price of each metered action when paid from the wallet.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RateTable {
    pub basic: Decimal,
    pub realtime_validation: Decimal,
}

impl RateTable {
    pub fn new() -> Result<Self, Report> {
        Self::validated(
            parse_env("BASIC_FORM_RATE", "5")?,
            parse_env("REALTIME_VALIDATION_RATE", "50")?,
        )
    }

    pub fn validated(basic: Decimal, realtime_validation: Decimal) -> Result<Self, Report> {
        for (name, rate) in [("basic", basic), ("realtime_validation", realtime_validation)] {
            if rate <= Decimal::ZERO {
                return Err(eyre!("Rate for {} must be positive, got {}", name, rate));
            }
        }

        Ok(Self {
            basic,
            realtime_validation,
        })
    }

    pub fn rate_for(&self, action: ActionKind) -> Decimal {
        match action {
            ActionKind::Basic => self.basic,
            ActionKind::RealtimeValidation => self.realtime_validation,
        }
    }
}

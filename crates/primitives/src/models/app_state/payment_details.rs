use eyre::eyre;
use eyre::Report;
use secrecy::SecretString;
use std::env;

#[derive(Debug, Clone)]
pub struct PaymentInfo {
    pub payment_key_secret: SecretString,
    pub payment_webhook_secret: SecretString,
}

impl PaymentInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            payment_key_secret: SecretString::new(
                env::var("PAYMENT_KEY_SECRET")
                    .map_err(|_| eyre!("PAYMENT_KEY_SECRET must be set"))?
                    .into(),
            ),

            payment_webhook_secret: SecretString::new(
                env::var("PAYMENT_WEBHOOK_SECRET")
                    .map_err(|_| eyre!("PAYMENT_WEBHOOK_SECRET must be set"))?
                    .into(),
            ),
        })
    }
}

use eyre::eyre;
use eyre::Report;
use secrecy::SecretString;
use std::env;

#[derive(Debug, Clone)]
pub struct NotifierInfo {
    pub notify_api_url: String,
    pub notify_auth_key: SecretString,
    pub notify_template_id: String,
    pub notify_whatsapp_number: String,
    pub notify_from_email: String,
}

impl NotifierInfo {
    pub fn new() -> Result<Self, Report> {
        Ok(Self {
            notify_api_url: env::var("NOTIFY_API_URL")
                .unwrap_or_else(|_| "https://api.msg91.com/api/v5".into()),

            notify_auth_key: SecretString::new(
                env::var("NOTIFY_AUTH_KEY")
                    .map_err(|_| eyre!("NOTIFY_AUTH_KEY must be set"))?
                    .into(),
            ),

            notify_template_id: env::var("NOTIFY_TEMPLATE_ID").unwrap_or_default(),

            notify_whatsapp_number: env::var("NOTIFY_WHATSAPP_NUMBER").unwrap_or_default(),

            notify_from_email: env::var("NOTIFY_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@walletgate.local".into()),
        })
    }
}

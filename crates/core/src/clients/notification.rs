use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::{error, warn};
use walletgate_primitives::error::ApiError;
use walletgate_primitives::models::app_state::notifier_details::NotifierInfo;
use walletgate_primitives::models::dtos::alert_dto::{DispatchReceipt, Recipient};
use walletgate_primitives::models::entities::enum_types::{NotificationChannel, NotificationKind};

/// Outbound delivery of a single notification over one channel.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn send(
        &self,
        recipient: &Recipient,
        channel: NotificationChannel,
        kind: NotificationKind,
        message: &str,
    ) -> Result<DispatchReceipt, ApiError>;
}

/// SMS-gateway style HTTP API: flow SMS, WhatsApp outbound and email send.
#[derive(Clone)]
pub struct HttpNotificationDispatcher {
    http: Client,
    base_url: Url,
    auth_key: SecretString,
    template_id: String,
    whatsapp_number: String,
    from_email: String,
}

impl HttpNotificationDispatcher {
    pub fn new(http: Client, details: &NotifierInfo) -> Result<Self, ApiError> {
        let base_url = Url::parse(&details.notify_api_url)
            .map_err(|_| ApiError::Internal("Invalid notification API URL".into()))?;

        Ok(Self {
            http,
            base_url,
            auth_key: details.notify_auth_key.clone(),
            template_id: details.notify_template_id.clone(),
            whatsapp_number: details.notify_whatsapp_number.clone(),
            from_email: details.notify_from_email.clone(),
        })
    }

    fn sms_payload(&self, mobile: &str, message: &str) -> Value {
        json!({
            "template_id": self.template_id,
            "short_url": "0",
            "recipients": [{ "mobiles": mobile, "message": message }]
        })
    }

    fn whatsapp_payload(&self, mobile: &str, message: &str) -> Value {
        json!({
            "integrated_number": self.whatsapp_number,
            "content_type": "text",
            "payload": {
                "messaging_product": "whatsapp",
                "recipient_type": "individual",
                "to": mobile,
                "type": "text",
                "text": { "body": message }
            }
        })
    }

    fn email_payload(&self, email: &str, subject: &str, message: &str) -> Value {
        let escaped = message.replace('<', "&lt;").replace('>', "&gt;");

        json!({
            "to": [{ "email": email }],
            "from": { "email": self.from_email },
            "subject": subject,
            "textBody": message,
            "htmlBody": format!("<p>{}</p>", escaped)
        })
    }

    async fn post(&self, path: &str, payload: &Value) -> Result<DispatchReceipt, ApiError> {
        let resp = self
            .http
            .post(self.endpoint(path))
            .header("authkey", self.auth_key.expose_secret())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "notify.dispatch: failed to reach gateway");
                ApiError::Notification("Notification gateway unavailable".into())
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            warn!(
                http_status = status.as_u16(),
                response = %body_text.chars().take(200).collect::<String>(),
                "notify.dispatch: gateway rejected message"
            );
            return Ok(DispatchReceipt::failed());
        }

        Ok(DispatchReceipt::sent())
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        let joined = format!("{}/{}", url.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        url
    }
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn send(
        &self,
        recipient: &Recipient,
        channel: NotificationChannel,
        kind: NotificationKind,
        message: &str,
    ) -> Result<DispatchReceipt, ApiError> {
        match channel {
            NotificationChannel::Sms | NotificationChannel::Whatsapp => {
                let mobile = recipient
                    .mobile
                    .as_deref()
                    .filter(|m| !m.trim().is_empty())
                    .ok_or_else(|| ApiError::Notification("Mobile number not found".into()))?;

                if channel == NotificationChannel::Sms {
                    self.post("flow/", &self.sms_payload(mobile, message)).await
                } else {
                    self.post(
                        "whatsapp/whatsapp-outbound-message/",
                        &self.whatsapp_payload(mobile, message),
                    )
                    .await
                }
            }
            NotificationChannel::Email => {
                let payload = self.email_payload(&recipient.email, kind.email_subject(), message);
                self.post("email/send", &payload).await
            }
        }
    }
}

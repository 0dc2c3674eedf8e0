use crate::app_state::AppState;
use crate::services::wallet_service::WalletService;
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{info, warn};
use uuid::Uuid;
use walletgate_primitives::error::ApiError;

type HmacSha256 = Hmac<Sha256>;

const CAPTURED_EVENT: &str = "payment.captured";

#[derive(Debug, Deserialize)]
pub struct GatewayWebhook {
    pub event: String,
    #[serde(default)]
    pub payload: Option<WebhookPayload>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    pub payment: PaymentWrapper,
}

#[derive(Debug, Deserialize)]
pub struct PaymentWrapper {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    /// Minor units (paise).
    pub amount: i64,
    #[serde(default)]
    pub notes: PaymentNotes,
}

#[derive(Debug, Default, Deserialize)]
pub struct PaymentNotes {
    pub user_id: Option<Uuid>,
}

pub struct PaymentService;

impl PaymentService {
    /// Checks the checkout callback signature over `"{order_id}|{payment_id}"`.
    pub fn verify_checkout_signature(
        state: &AppState,
        order_id: &str,
        payment_id: &str,
        signature: &str,
    ) -> Result<(), ApiError> {
        let secret = state.config.payment_details.payment_key_secret.expose_secret();
        let payload = format!("{}|{}", order_id, payment_id);

        verify_hmac_sha256(secret, payload.as_bytes(), signature)
            .map_err(|_| ApiError::Payment("Invalid payment signature".into()))
    }

    pub fn verify_webhook_signature(
        state: &AppState,
        body: &[u8],
        signature: &str,
    ) -> Result<(), ApiError> {
        let secret = state
            .config
            .payment_details
            .payment_webhook_secret
            .expose_secret();

        verify_hmac_sha256(secret, body, signature)
            .map_err(|_| ApiError::Payment("Invalid webhook signature".into()))
    }

    /// Credits a verified payment, keyed by the gateway payment id so that the
    /// checkout callback and the webhook can both apply it safely.
    pub async fn apply_captured_payment(
        state: &AppState,
        user_id: Uuid,
        amount: Decimal,
        payment_id: &str,
    ) -> Result<Decimal, ApiError> {
        if payment_id.trim().is_empty() {
            return Err(ApiError::Payment("Payment id is required".into()));
        }

        let balance =
            WalletService::credit_with_retry(state, user_id, amount, Some(payment_id.to_string()))
                .await?;

        info!(user_id = %user_id, payment_id = %payment_id, "payment.capture: applied");

        Ok(balance)
    }

    /// Verifies and applies a gateway webhook. Returns the new balance for a
    /// captured payment, `None` for events that need no action.
    pub async fn handle_webhook(
        state: &AppState,
        body: &[u8],
        signature: &str,
    ) -> Result<Option<Decimal>, ApiError> {
        Self::verify_webhook_signature(state, body, signature)?;

        let webhook: GatewayWebhook = serde_json::from_slice(body).map_err(|e| {
            warn!(error = %e, "payment.webhook: malformed payload");
            ApiError::Payment("Malformed webhook payload".into())
        })?;

        if webhook.event != CAPTURED_EVENT {
            info!(event = %webhook.event, "payment.webhook: ignored");
            return Ok(None);
        }

        let entity = webhook
            .payload
            .map(|p| p.payment.entity)
            .ok_or_else(|| ApiError::Payment("Webhook missing payment entity".into()))?;

        let user_id = entity
            .notes
            .user_id
            .ok_or_else(|| ApiError::Payment("Webhook payment has no user_id note".into()))?;

        let amount = Decimal::new(entity.amount, 2);

        Self::apply_captured_payment(state, user_id, amount, &entity.id)
            .await
            .map(Some)
    }
}

fn verify_hmac_sha256(secret: &str, payload: &[u8], signature: &str) -> Result<(), ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::Internal("Invalid signing secret".into()))?;

    mac.update(payload);
    let expected = hex::encode(mac.finalize().into_bytes());

    if expected
        .as_bytes()
        .ct_eq(signature.trim().to_lowercase().as_bytes())
        .unwrap_u8()
        != 1
    {
        return Err(ApiError::Payment("Signature mismatch".into()));
    }

    Ok(())
}

/// Hex HMAC-SHA256 of `payload`, as a gateway would send it.
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, ApiError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| ApiError::Internal("Invalid signing secret".into()))?;
    mac.update(payload);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

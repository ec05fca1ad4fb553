use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::PaymentGateway;
use crate::error::{AppError, Result, msg};

type HmacSha512 = Hmac<Sha512>;

/// Header Paystack puts the webhook signature in.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Event name for a completed charge.
pub const CHARGE_SUCCESS: &str = "charge.success";

/// Transaction status Paystack reports for a completed charge.
pub const STATUS_SUCCESS: &str = "success";

#[derive(Debug, Clone, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    /// Amount in the currency's subunit (kobo for NGN)
    pub amount: i64,
    pub currency: String,
    pub callback_url: String,
    pub metadata: TransactionMetadata,
}

/// Metadata echoed back on webhooks and verifications; used for correlation.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionMetadata {
    pub order_id: String,
    pub order_number: String,
    pub customer_email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InitializedTransaction {
    pub authorization_url: String,
    pub reference: String,
}

/// Envelope of every Paystack API response.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    status: bool,
    data: Option<T>,
}

/// Webhook body. `data` is kept raw until the event type is known.
#[derive(Debug, Deserialize)]
pub struct PaystackEvent {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Transaction fields shared by `charge.success` webhooks and verify responses.
#[derive(Debug, Default, Deserialize)]
pub struct ChargeData {
    pub reference: Option<String>,
    pub status: Option<String>,
    pub channel: Option<String>,
    /// Usually an object, but Paystack sends `""` when none was set
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl ChargeData {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(STATUS_SUCCESS)
    }
}

#[derive(Debug, Clone)]
pub struct PaystackClient {
    client: Client,
    secret_key: String,
    api_base: String,
}

impl PaystackClient {
    pub fn new(secret_key: impl Into<String>, api_base: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            secret_key: secret_key.into(),
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction> {
        let response = self
            .client
            .post(self.url("/transaction/initialize"))
            .bearer_auth(&self.secret_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                AppError::gateway(format!("{}: {}", msg::PAYSTACK_INIT_FAILED, e), None)
            })?;

        let http_status = response.status();
        let body = read_json_body(response).await?;

        let envelope: Option<ApiEnvelope<InitializedTransaction>> =
            serde_json::from_value(body.clone()).ok();

        match envelope {
            Some(ApiEnvelope {
                status: true,
                data: Some(data),
            }) if http_status.is_success()
                && !data.authorization_url.is_empty()
                && !data.reference.is_empty() =>
            {
                Ok(data)
            }
            _ => {
                tracing::error!("Paystack initialize rejected (http {})", http_status);
                Err(AppError::gateway(msg::PAYSTACK_INIT_FAILED, Some(body)))
            }
        }
    }

    async fn verify(&self, reference: &str) -> Result<serde_json::Value> {
        let path = format!("/transaction/verify/{}", urlencoding::encode(reference));
        let response = self
            .client
            .get(self.url(&path))
            .bearer_auth(&self.secret_key)
            .send()
            .await
            .map_err(|e| {
                AppError::gateway(format!("{}: {}", msg::PAYSTACK_VERIFY_FAILED, e), None)
            })?;

        if !response.status().is_success() {
            tracing::warn!(
                "Paystack verify returned http {} for reference {}",
                response.status(),
                reference
            );
        }

        read_json_body(response).await
    }

    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> bool {
        verify_signature(&self.secret_key, payload, signature)
    }
}

/// Parse a provider body as JSON. Non-JSON bodies are gateway errors that
/// echo the raw text.
async fn read_json_body(response: reqwest::Response) -> Result<serde_json::Value> {
    let text = response
        .text()
        .await
        .map_err(|e| AppError::gateway(format!("Failed to read Paystack response: {}", e), None))?;

    serde_json::from_str(&text).map_err(|_| {
        AppError::gateway(
            "Paystack returned a non-JSON response",
            Some(serde_json::Value::String(text)),
        )
    })
}

/// Hex-encoded HMAC-SHA512 of `payload` keyed by `secret`.
pub fn compute_signature(secret: &str, payload: &[u8]) -> String {
    // HMAC accepts keys of any length, so this cannot fail
    let mut mac = match HmacSha512::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a Paystack webhook signature over the raw request body.
///
/// The provided signature is hex-decoded and compared in constant time.
/// Non-hex or wrong-length input is simply invalid.
pub fn verify_signature(secret: &str, payload: &[u8], signature: &str) -> bool {
    let Ok(provided) = hex::decode(signature.trim()) else {
        return false;
    };

    let Ok(mut mac) = HmacSha512::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    let expected = mac.finalize().into_bytes();

    // Length is public (always 64 bytes for SHA-512)
    if expected.len() != provided.len() {
        return false;
    }

    expected.as_slice().ct_eq(provided.as_slice()).into()
}

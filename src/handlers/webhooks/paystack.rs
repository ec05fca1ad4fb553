use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde_json::{Value, json};

use crate::db::AppState;
use crate::error::msg;
use crate::models::{PaymentConfirmation, PaymentSource};
use crate::payments::{CHARGE_SUCCESS, ChargeData, PaystackEvent, SIGNATURE_HEADER};
use crate::reconcile::{OrderHints, ReconcileOutcome, reconcile_and_record};

pub type WebhookResponse = (StatusCode, Json<Value>);

fn rejected(status: StatusCode, message: &str) -> WebhookResponse {
    (status, Json(json!({ "error": message })))
}

fn received() -> WebhookResponse {
    (StatusCode::OK, Json(json!({ "received": true })))
}

fn received_with_update(updated: bool) -> WebhookResponse {
    (
        StatusCode::OK,
        Json(json!({ "received": true, "updated": updated })),
    )
}

fn extract_signature(headers: &HeaderMap) -> Result<&str, WebhookResponse> {
    headers
        .get(SIGNATURE_HEADER)
        .ok_or_else(|| rejected(StatusCode::BAD_REQUEST, msg::MISSING_SIGNATURE))?
        .to_str()
        .map_err(|e| {
            tracing::debug!("Invalid UTF-8 in Paystack signature header: {}", e);
            rejected(StatusCode::BAD_REQUEST, msg::INVALID_SIGNATURE_HEADER)
        })
}

/// `POST /paystack-webhook`
///
/// Only authentication failures are non-200. Once the signature checks out,
/// every outcome is acknowledged so Paystack stops redelivering. Charges that
/// name an order or reference but match nothing go to the unmatched ledger.
pub async fn handle_paystack_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> WebhookResponse {
    let Some(gateway) = state.gateway.clone() else {
        tracing::error!("Paystack webhook received but PAYSTACK_SECRET_KEY is not set");
        return rejected(
            StatusCode::INTERNAL_SERVER_ERROR,
            msg::SERVER_MISCONFIGURATION,
        );
    };

    let signature = match extract_signature(&headers) {
        Ok(s) => s,
        Err(response) => return response,
    };

    // Signature covers the raw bytes; parse only after it verifies
    if !gateway.verify_webhook_signature(&body, signature) {
        tracing::warn!("Rejected Paystack webhook with invalid signature");
        return rejected(StatusCode::UNAUTHORIZED, msg::INVALID_SIGNATURE);
    }

    let event: PaystackEvent = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Failed to parse authenticated Paystack webhook: {}", e);
            return received();
        }
    };

    if event.event != CHARGE_SUCCESS {
        tracing::debug!("Ignoring Paystack event {}", event.event);
        return received();
    }

    let charge: ChargeData = serde_json::from_value(event.data.clone()).unwrap_or_else(|e| {
        tracing::warn!("Unexpected charge.success data shape: {}", e);
        ChargeData::default()
    });

    let hints = OrderHints::from_metadata(&charge.metadata, charge.reference.as_deref());
    let confirmation =
        PaymentConfirmation::new(hints.reference.as_deref(), charge.channel.as_deref());
    let payload = event_payload(&event);

    let conn = match state.db.get() {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(
                "No DB connection for Paystack webhook (reference {:?}): {}",
                hints.reference,
                e
            );
            return received_with_update(false);
        }
    };

    match reconcile_and_record(
        &conn,
        PaymentSource::Webhook,
        &hints,
        &confirmation,
        Some(&payload),
    ) {
        Ok(ReconcileOutcome::Updated { .. }) => received_with_update(true),
        Ok(ReconcileOutcome::NoMatch) => received_with_update(false),
        Ok(ReconcileOutcome::NoIdentifier) => received(),
        Err(e) => {
            tracing::error!(
                "Failed to apply Paystack charge {:?}: {}",
                hints.reference,
                e
            );
            received_with_update(false)
        }
    }
}

fn event_payload(event: &PaystackEvent) -> Value {
    json!({ "event": event.event, "data": event.data })
}

use axum::extract::State;
use serde::Deserialize;

use crate::db::AppState;
use crate::error::{AppError, Result, msg};
use crate::extractors::{Json, Query};
use crate::models::{PaymentConfirmation, PaymentSource};
use crate::payments::ChargeData;
use crate::reconcile::{OrderHints, reconcile_and_record};

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    #[serde(default)]
    pub reference: Option<String>,
}

/// Verify a transaction by reference and confirm its order if paid.
///
/// The provider payload is returned unchanged whatever happens locally.
/// The webhook is the authoritative path; this one only closes the gap when
/// the shopper returns before the webhook lands.
pub async fn verify_payment(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<serde_json::Value>> {
    let reference = query
        .reference
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .ok_or_else(|| AppError::BadRequest(msg::MISSING_REFERENCE.into()))?
        .to_string();

    let gateway = state.gateway()?;
    let payload = gateway.verify(&reference).await?;

    let charge = payload
        .get("data")
        .cloned()
        .and_then(|data| serde_json::from_value::<ChargeData>(data).ok())
        .unwrap_or_default();

    if charge.is_success() {
        let hints = OrderHints::from_metadata(&charge.metadata, Some(&reference));
        let confirmation =
            PaymentConfirmation::new(Some(reference.as_str()), charge.channel.as_deref());

        let result = state.db.get().map_err(AppError::from).and_then(|conn| {
            reconcile_and_record(
                &conn,
                PaymentSource::Verify,
                &hints,
                &confirmation,
                Some(&payload),
            )
        });
        if let Err(e) = result {
            tracing::error!("Failed to update order for reference {}: {}", reference, e);
        }
    } else {
        tracing::debug!(
            "Transaction {} not successful (status: {:?})",
            reference,
            charge.status
        );
    }

    Ok(Json(payload))
}

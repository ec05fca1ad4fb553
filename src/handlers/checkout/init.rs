use axum::extract::State;
use axum::http::HeaderMap;
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result, msg};
use crate::extractors::Json;
use crate::id::generate_order_number;
use crate::models::CheckoutRequest;
use crate::payments::{InitializeTransaction, TransactionMetadata};
use crate::util::{callback_base_url, checkout_callback_url, to_minor_units};

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub authorization_url: String,
    pub reference: String,
    pub order_id: String,
    pub order_number: String,
}

/// Create a pending order and hand the shopper a Paystack payment page.
pub async fn initiate_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>> {
    let gateway = state.gateway()?;
    let checkout = request.validate(&state.default_currency)?;

    let amount = to_minor_units(checkout.totals.total_amount)
        .ok_or_else(|| AppError::BadRequest(msg::AMOUNT_TOO_LARGE.into()))?;

    let order = {
        let mut conn = state.db.get()?;
        let order_number = generate_order_number(&state.order_number_prefix);
        let order = queries::create_order(&conn, &checkout.to_create_order(order_number))
            .map_err(|e| {
                tracing::error!("Order insert failed: {}", e);
                AppError::Internal(msg::ORDER_CREATE_FAILED.into())
            })?;

        if let Err(e) = queries::create_order_items(&mut conn, &order.id, &checkout.items) {
            tracing::error!(
                "Failed to create {} line items for order {}: {}",
                checkout.items.len(),
                order.order_number,
                e
            );
        }
        order
    };

    tracing::info!(
        "Created order {} ({} {}) for {}",
        order.order_number,
        order.total_amount,
        order.currency,
        checkout.email
    );

    let base = callback_base_url(
        &headers,
        state.callback_url_base.as_deref(),
        &state.base_url,
    );

    let initialized = gateway
        .initialize(&InitializeTransaction {
            email: checkout.email.clone(),
            amount,
            currency: order.currency.clone(),
            callback_url: checkout_callback_url(&base),
            metadata: TransactionMetadata {
                order_id: order.id.clone(),
                order_number: order.order_number.clone(),
                customer_email: checkout.email.clone(),
            },
        })
        .await?;

    // Best-effort: the payment page is already issued
    let stored = state
        .db
        .get()
        .map_err(AppError::from)
        .and_then(|conn| {
            queries::set_order_payment_reference(&conn, &order.id, &initialized.reference)
        });
    match stored {
        Ok(true) => {}
        Ok(false) => tracing::warn!("Order {} vanished before reference was stored", order.id),
        Err(e) => tracing::error!(
            "Failed to store reference {} on order {}: {}",
            initialized.reference,
            order.id,
            e
        ),
    }

    Ok(Json(CheckoutResponse {
        authorization_url: initialized.authorization_url,
        reference: initialized.reference,
        order_id: order.id,
        order_number: order.order_number,
    }))
}

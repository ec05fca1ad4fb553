use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use super::OrderItem;

/// Order lifecycle. Fulfillment states past `Confirmed` are owned elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
}

/// One checkout attempt.
///
/// Monetary fields are whole currency units (naira, not kobo) and are fixed
/// at creation. Only the status/payment fields change afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    /// Authenticated customer. Mutually exclusive with the guest fields.
    pub user_id: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    /// Payment channel (card, bank, ussd, ...) once the provider reports it
    pub payment_method: Option<String>,
    /// Provider reference used to correlate webhooks and verifications
    pub payment_intent_id: Option<String>,
    pub currency: String,
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
    /// Opaque address blob from the checkout form
    pub shipping_address: serde_json::Value,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Data required to create a new order (already validated and rounded).
#[derive(Debug, Clone)]
pub struct CreateOrder {
    pub order_number: String,
    pub user_id: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub currency: String,
    pub totals: OrderTotals,
    pub shipping_address: serde_json::Value,
}

/// Rounded order totals in whole currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub shipping_cost: i64,
    pub tax_amount: i64,
    pub discount_amount: i64,
    pub total_amount: i64,
}

impl OrderTotals {
    /// `subtotal + shipping - discount + tax`
    pub fn computed_total(&self) -> i64 {
        self.subtotal + self.shipping_cost + self.tax_amount - self.discount_amount
    }
}

/// Field set applied when the provider reports a successful charge.
///
/// Applying it is a blind overwrite, so repeating it is harmless. A missing
/// reference leaves the stored one in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentConfirmation {
    pub reference: Option<String>,
    pub channel: String,
}

impl PaymentConfirmation {
    pub const DEFAULT_CHANNEL: &'static str = "card";

    pub fn new(reference: Option<&str>, channel: Option<&str>) -> Self {
        let channel = channel
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(Self::DEFAULT_CHANNEL);
        Self {
            reference: reference
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
            channel: channel.to_string(),
        }
    }
}

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

/// Which entry point saw the payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum PaymentSource {
    Webhook,
    Verify,
}

/// A successful charge that could not be tied to any order.
/// Kept for manual reconciliation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnmatchedPayment {
    pub id: String,
    pub source: PaymentSource,
    pub reference: Option<String>,
    /// Order ID or number the provider metadata pointed at, if any
    pub order_hint: Option<String>,
    pub payload: Option<serde_json::Value>,
    pub created_at: i64,
}

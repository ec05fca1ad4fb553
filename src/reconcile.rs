//! Correlating provider payment events with local orders.
//!
//! Webhooks and client verifications both end here. Matchers are tried in a
//! fixed order (order ID, order number, stored reference). The first one that
//! updates a row wins. A hint that matches nothing falls through to the next
//! matcher.

use rusqlite::Connection;

use crate::db::queries;
use crate::error::Result;
use crate::id::is_valid_prefixed_id;
use crate::models::{PaymentConfirmation, PaymentSource};
use crate::util::value_as_string;

/// Correlation identifiers pulled from a provider payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderHints {
    pub order_id: Option<String>,
    pub order_number: Option<String>,
    pub reference: Option<String>,
}

impl OrderHints {
    /// Read hints from Paystack transaction metadata.
    ///
    /// Accepts snake_case and camelCase keys, string or numeric values.
    /// Anything that is not an object counts as empty metadata.
    pub fn from_metadata(metadata: &serde_json::Value, reference: Option<&str>) -> Self {
        let field = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| metadata.get(*key))
                .find_map(value_as_string)
        };

        Self {
            order_id: field(&["order_id", "orderId"]),
            order_number: field(&["order_number", "orderNumber"]),
            reference: reference
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.order_id.is_none() && self.order_number.is_none() && self.reference.is_none()
    }

    /// The most specific identifier, for logs and the unmatched ledger.
    pub fn primary_hint(&self) -> Option<&str> {
        self.order_id
            .as_deref()
            .or(self.order_number.as_deref())
    }
}

/// One way of finding the order a payment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderMatcher {
    ById,
    ByNumber,
    ByReference,
}

impl OrderMatcher {
    /// Precedence order.
    pub const ALL: [OrderMatcher; 3] = [Self::ById, Self::ByNumber, Self::ByReference];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ById => "order_id",
            Self::ByNumber => "order_number",
            Self::ByReference => "reference",
        }
    }

    fn column(&self) -> &'static str {
        match self {
            Self::ById => "id",
            Self::ByNumber => "order_number",
            Self::ByReference => "payment_intent_id",
        }
    }

    /// The value this matcher would look up, or `None` if it does not apply.
    fn key<'a>(&self, hints: &'a OrderHints) -> Option<&'a str> {
        match self {
            // IDs we never issued cannot match; skip the query
            Self::ById => hints
                .order_id
                .as_deref()
                .filter(|id| is_valid_prefixed_id(id)),
            Self::ByNumber => hints.order_number.as_deref(),
            Self::ByReference => hints.reference.as_deref(),
        }
    }
}

impl std::fmt::Display for OrderMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The order was moved to confirmed/paid.
    Updated {
        order_id: String,
        matched_by: OrderMatcher,
    },
    /// Identifiers were present but no order matched any of them.
    NoMatch,
    /// The payload carried nothing to correlate on.
    NoIdentifier,
}

/// Apply the paid/confirmed transition to the order the hints point at.
pub fn reconcile_payment(
    conn: &Connection,
    hints: &OrderHints,
    confirmation: &PaymentConfirmation,
) -> Result<ReconcileOutcome> {
    if hints.is_empty() {
        return Ok(ReconcileOutcome::NoIdentifier);
    }

    for matcher in OrderMatcher::ALL {
        let Some(key) = matcher.key(hints) else {
            continue;
        };

        let updated = queries::confirm_order_payment(conn, matcher.column(), key, confirmation)?;
        if let Some(order_id) = updated.into_iter().next() {
            return Ok(ReconcileOutcome::Updated {
                order_id,
                matched_by: matcher,
            });
        }

        tracing::debug!("No order matched {}={}, trying next matcher", matcher, key);
    }

    Ok(ReconcileOutcome::NoMatch)
}

/// Reconcile and keep a record of charges that could not be placed.
///
/// Only `NoMatch` is recorded. A charge with no identifiers at all is logged
/// and dropped.
///
/// Used by both entry points. Errors are returned to the caller, which decides
/// whether they are visible to the client.
pub fn reconcile_and_record(
    conn: &Connection,
    source: PaymentSource,
    hints: &OrderHints,
    confirmation: &PaymentConfirmation,
    payload: Option<&serde_json::Value>,
) -> Result<ReconcileOutcome> {
    let outcome = reconcile_payment(conn, hints, confirmation)?;

    match &outcome {
        ReconcileOutcome::Updated {
            order_id,
            matched_by,
        } => {
            tracing::info!(
                "Payment confirmed via {}: order={}, reference={:?}, channel={}",
                source.as_ref(),
                order_id,
                confirmation.reference,
                confirmation.channel,
            );
            tracing::debug!("Order {} matched by {}", order_id, matched_by);
        }
        ReconcileOutcome::NoIdentifier => {
            tracing::warn!(
                "Payment from {} carried no reference or order metadata",
                source.as_ref()
            );
        }
        ReconcileOutcome::NoMatch => {
            tracing::warn!(
                "Unreconciled payment from {}: reference={:?}, hint={:?}",
                source.as_ref(),
                confirmation.reference,
                hints.primary_hint(),
            );
            if let Err(e) = queries::record_unmatched_payment(
                conn,
                source,
                hints.reference.as_deref(),
                hints.primary_hint(),
                payload,
            ) {
                tracing::error!("Failed to record unmatched payment: {}", e);
            }
        }
    }

    Ok(outcome)
}

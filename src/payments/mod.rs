//! Payment provider seam.
//!
//! Handlers only talk to `PaymentGateway`, so the Paystack client is built once
//! at startup and tests can swap in a fake.

mod paystack;

pub use paystack::*;

use async_trait::async_trait;

use crate::error::Result;

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a hosted-checkout transaction.
    ///
    /// A provider rejection is an `AppError::Gateway` carrying the provider body.
    async fn initialize(&self, request: &InitializeTransaction) -> Result<InitializedTransaction>;

    /// Look a transaction up by reference and return the provider's raw JSON,
    /// whatever its HTTP status. Only transport or parse failures are errors.
    async fn verify(&self, reference: &str) -> Result<serde_json::Value>;

    /// Check a webhook signature against the raw, unparsed request body.
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> bool;
}

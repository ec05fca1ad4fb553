//! Storefront payment reconciliation service.
//!
//! Creates orders for checkouts, hands shoppers to Paystack, and marks orders
//! paid from either the signed Paystack webhook or a client-side verification.

pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod id;
pub mod models;
pub mod payments;
pub mod reconcile;
pub mod util;

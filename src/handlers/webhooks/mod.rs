mod paystack;

pub use paystack::*;

use axum::{Router, routing::post};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/paystack-webhook", post(handle_paystack_webhook))
}

mod init;
mod orders;
mod verify;

pub use init::*;
pub use orders::*;
pub use verify::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/paystack-init", post(initiate_checkout))
        .route("/paystack-verify", get(verify_payment))
        .route("/orders/{order_number}", get(get_order))
}

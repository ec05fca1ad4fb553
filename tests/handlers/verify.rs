//! Tests for GET /paystack-verify

use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "../common/mod.rs"]
mod common;
use common::*;

fn successful_verification(reference: &str, metadata: Value) -> Value {
    json!({
        "status": true,
        "message": "Verification successful",
        "data": {
            "id": 4099260516u64,
            "status": "success",
            "reference": reference,
            "amount": 1050000,
            "channel": "bank_transfer",
            "metadata": metadata,
        }
    })
}

#[tokio::test]
async fn test_verify_missing_reference_returns_400() {
    let (state, gateway) = create_test_app_state_with_gateway();

    for uri in ["/paystack-verify", "/paystack-verify?reference=", "/paystack-verify?reference=%20"] {
        let (status, body) = send(&state, get(uri)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {}", uri);
        assert_eq!(body["details"], "Missing reference");
    }
    assert!(gateway.verify_calls().is_empty());
}

#[tokio::test]
async fn test_verify_without_secret_returns_500() {
    let state = create_test_app_state(None);
    let (status, body) = send(&state, get("/paystack-verify?reference=ref_1")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server misconfiguration");
}

#[tokio::test]
async fn test_verify_success_confirms_order_by_metadata_id() {
    let (state, gateway) = create_test_app_state_with_gateway();
    let order = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, "FF-1700000000000-ABCDEFGHI", 10500)
    };

    let provider_payload = successful_verification(
        "ref_live_1",
        json!({ "order_id": order.id, "order_number": order.order_number }),
    );
    gateway.set_verify_response(provider_payload.clone());

    let (status, body) = send(&state, get("/paystack-verify?reference=ref_live_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, provider_payload, "payload must pass through unchanged");
    assert_eq!(gateway.verify_calls(), vec!["ref_live_1".to_string()]);

    let updated = order_by_id(&state, &order.id);
    assert_eq!(updated.payment_status, PaymentStatus::Paid);
    assert_eq!(updated.status, OrderStatus::Confirmed);
    assert_eq!(updated.payment_method.as_deref(), Some("bank_transfer"));
    assert_eq!(updated.payment_intent_id.as_deref(), Some("ref_live_1"));
}

#[tokio::test]
async fn test_verify_falls_back_to_stored_reference() {
    let (state, gateway) = create_test_app_state_with_gateway();
    let order = {
        let conn = state.db.get().unwrap();
        let order = create_test_order(&conn, "FF-1", 100);
        queries::set_order_payment_reference(&conn, &order.id, "ref_stored").unwrap();
        order
    };

    // Paystack sends "" when no metadata was attached
    let mut payload = successful_verification("ref_stored", json!(""));
    payload["data"].as_object_mut().unwrap().remove("channel");
    gateway.set_verify_response(payload);

    let (status, _) = send(&state, get("/paystack-verify?reference=ref_stored")).await;
    assert_eq!(status, StatusCode::OK);

    let updated = order_by_id(&state, &order.id);
    assert_eq!(updated.payment_status, PaymentStatus::Paid);
    assert_eq!(updated.payment_method.as_deref(), Some("card"));
}

#[tokio::test]
async fn test_verify_non_success_leaves_order_pending() {
    let (state, gateway) = create_test_app_state_with_gateway();
    let order = {
        let conn = state.db.get().unwrap();
        let order = create_test_order(&conn, "FF-1", 100);
        queries::set_order_payment_reference(&conn, &order.id, "ref_1").unwrap();
        order
    };

    let payload = json!({
        "status": true,
        "message": "Verification successful",
        "data": { "status": "failed", "reference": "ref_1", "metadata": { "order_id": order.id } }
    });
    gateway.set_verify_response(payload.clone());

    let (status, body) = send(&state, get("/paystack-verify?reference=ref_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, payload);
    assert_eq!(order_by_id(&state, &order.id).payment_status, PaymentStatus::Pending);
    assert!(unmatched_payments(&state).is_empty());
}

#[tokio::test]
async fn test_verify_passes_through_on_update_failure() {
    let (state, gateway) = create_test_app_state_with_gateway();
    let order = {
        let conn = state.db.get().unwrap();
        let order = create_test_order(&conn, "FF-1", 100);
        break_order_updates(&conn);
        order
    };

    let payload = successful_verification("ref_1", json!({ "order_id": order.id }));
    gateway.set_verify_response(payload.clone());

    let (status, body) = send(&state, get("/paystack-verify?reference=ref_1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "success");
    assert_eq!(body, payload);
    assert_eq!(order_by_id(&state, &order.id).payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn test_verify_repeated_calls_are_idempotent() {
    let (state, gateway) = create_test_app_state_with_gateway();
    let order = {
        let conn = state.db.get().unwrap();
        create_test_order(&conn, "FF-1", 100)
    };
    gateway.set_verify_response(successful_verification(
        "ref_1",
        json!({ "order_number": "FF-1" }),
    ));

    send(&state, get("/paystack-verify?reference=ref_1")).await;
    let first = order_by_id(&state, &order.id);
    send(&state, get("/paystack-verify?reference=ref_1")).await;
    let second = order_by_id(&state, &order.id);

    assert_eq!(first.status, second.status);
    assert_eq!(first.payment_status, second.payment_status);
    assert_eq!(first.payment_method, second.payment_method);
    assert_eq!(first.payment_intent_id, second.payment_intent_id);
    assert_eq!(gateway.verify_calls().len(), 2);
}

#[tokio::test]
async fn test_verify_unmatched_success_is_recorded() {
    let (state, gateway) = create_test_app_state_with_gateway();
    gateway.set_verify_response(successful_verification(
        "ref_orphan",
        json!({ "order_number": "FF-unknown" }),
    ));

    let (status, _) = send(&state, get("/paystack-verify?reference=ref_orphan")).await;
    assert_eq!(status, StatusCode::OK);

    let unmatched = unmatched_payments(&state);
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].source, PaymentSource::Verify);
    assert_eq!(unmatched[0].reference.as_deref(), Some("ref_orphan"));
    assert_eq!(unmatched[0].order_hint.as_deref(), Some("FF-unknown"));
}

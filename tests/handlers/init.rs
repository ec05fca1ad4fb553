//! Tests for POST /paystack-init

use std::sync::Arc;

use axum::http::{Request, StatusCode};
use serde_json::{Value, json};

#[path = "../common/mod.rs"]
mod common;
use common::*;

fn scenario_body() -> Value {
    json!({
        "email": "a@b.com",
        "items": [{ "product": { "id": 1, "price": 5000 }, "quantity": 2 }],
        "totals": { "subtotal": 10000, "shipping": 500, "tax": 0, "discount": 0, "total": 10500 }
    })
}

#[tokio::test]
async fn test_init_creates_order_and_converts_to_minor_units() {
    let (state, gateway) = create_test_app_state_with_gateway();

    let (status, body) = send(&state, post_json("/paystack-init", &scenario_body())).await;
    assert_eq!(status, StatusCode::OK, "unexpected body: {}", body);

    let authorization_url = body["authorization_url"].as_str().unwrap();
    let reference = body["reference"].as_str().unwrap();
    let order_id = body["order_id"].as_str().unwrap();
    let order_number = body["order_number"].as_str().unwrap();
    assert!(!authorization_url.is_empty());
    assert!(!reference.is_empty());
    assert!(order_number.starts_with("FF-"));

    let calls = gateway.initialize_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].amount, 1_050_000);
    assert_eq!(calls[0].email, "a@b.com");
    assert_eq!(calls[0].currency, "NGN");
    assert_eq!(calls[0].metadata.order_id, order_id);
    assert_eq!(calls[0].metadata.order_number, order_number);
    assert_eq!(calls[0].metadata.customer_email, "a@b.com");

    let order = order_by_id(&state, order_id);
    assert_eq!(order.total_amount, 10500);
    assert_eq!(order.subtotal, 10000);
    assert_eq!(order.shipping_cost, 500);
    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.payment_intent_id.as_deref(), Some(reference));
    assert_eq!(order.guest_email.as_deref(), Some("a@b.com"));
    assert_eq!(order.user_id, None);

    let conn = state.db.get().unwrap();
    let items = queries::list_order_items(&conn, order_id).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].product_id.as_deref(), Some("1"));
    assert_eq!(items[0].unit_price, 5000);
    assert_eq!(items[0].quantity, 2);
    assert_eq!(items[0].total_price, 10000);
    assert_eq!(items[0].product_name, "Product");
}

#[tokio::test]
async fn test_init_computes_total_when_absent_or_zero() {
    let (state, gateway) = create_test_app_state_with_gateway();

    for total in [Value::Null, json!(0)] {
        let mut body = scenario_body();
        body["totals"] = json!({
            "subtotal": 10000.4, "shipping": 499.5, "tax": 75, "discount": 1000, "total": total
        });

        let (status, response) = send(&state, post_json("/paystack-init", &body)).await;
        assert_eq!(status, StatusCode::OK, "unexpected body: {}", response);

        // round(10000.4) + round(499.5) + 75 - 1000
        let order = order_by_id(&state, response["order_id"].as_str().unwrap());
        assert_eq!(order.total_amount, 9575);
    }

    let amounts: Vec<i64> = gateway.initialize_calls().iter().map(|c| c.amount).collect();
    assert_eq!(amounts, vec![957_500, 957_500]);
}

#[tokio::test]
async fn test_init_callback_url_from_forwarded_headers() {
    let (state, gateway) = create_test_app_state_with_gateway();

    let request = Request::builder()
        .method("POST")
        .uri("/paystack-init")
        .header("content-type", "application/json")
        .header("host", "shop.example.com")
        .header("x-forwarded-proto", "https")
        .body(axum::body::Body::from(
            serde_json::to_vec(&scenario_body()).unwrap(),
        ))
        .unwrap();

    let (status, _) = send(&state, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        gateway.initialize_calls()[0].callback_url,
        "https://shop.example.com/checkout/callback"
    );
}

#[tokio::test]
async fn test_init_callback_url_override_wins() {
    let (mut state, gateway) = create_test_app_state_with_gateway();
    state.callback_url_base = Some("https://store.example.ng".to_string());

    let (status, _) = send(&state, post_json("/paystack-init", &scenario_body())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        gateway.initialize_calls()[0].callback_url,
        "https://store.example.ng/checkout/callback"
    );
}

#[tokio::test]
async fn test_init_authenticated_customer_has_no_guest_fields() {
    let (state, gateway) = create_test_app_state_with_gateway();

    let mut body = scenario_body();
    body["user_id"] = json!("user_42");
    body["phone"] = json!("+2348000000000");

    let (status, response) = send(&state, post_json("/paystack-init", &body)).await;
    assert_eq!(status, StatusCode::OK);

    let order = order_by_id(&state, response["order_id"].as_str().unwrap());
    assert_eq!(order.user_id.as_deref(), Some("user_42"));
    assert_eq!(order.guest_email, None);
    assert_eq!(order.guest_phone, None);
    // The provider still needs an email to send the receipt to
    assert_eq!(gateway.initialize_calls()[0].email, "a@b.com");
}

#[tokio::test]
async fn test_init_missing_fields_returns_400_without_side_effects() {
    let (state, gateway) = create_test_app_state_with_gateway();

    let mut missing_email = scenario_body();
    missing_email.as_object_mut().unwrap().remove("email");
    let mut empty_items = scenario_body();
    empty_items["items"] = json!([]);
    let mut missing_totals = scenario_body();
    missing_totals.as_object_mut().unwrap().remove("totals");

    for body in [missing_email, empty_items, missing_totals] {
        let (status, response) = send(&state, post_json("/paystack-init", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            response["details"],
            "Missing required fields: email, items, totals"
        );
    }

    assert!(gateway.initialize_calls().is_empty());
    let conn = state.db.get().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_init_rejects_malformed_values() {
    let (state, gateway) = create_test_app_state_with_gateway();

    let mut negative = scenario_body();
    negative["totals"]["shipping"] = json!(-1);
    let mut zero_quantity = scenario_body();
    zero_quantity["items"][0]["quantity"] = json!(0);
    let mut bad_currency = scenario_body();
    bad_currency["currency"] = json!("naira");
    let mut wrong_type = scenario_body();
    wrong_type["items"] = json!("not-a-list");

    for body in [negative, zero_quantity, bad_currency, wrong_type] {
        let (status, _) = send(&state, post_json("/paystack-init", &body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
    }
    assert!(gateway.initialize_calls().is_empty());
}

#[tokio::test]
async fn test_init_invalid_json_returns_400() {
    let (state, _gateway) = create_test_app_state_with_gateway();

    let request = Request::builder()
        .method("POST")
        .uri("/paystack-init")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();

    let (status, body) = send(&state, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_init_without_secret_returns_500() {
    let state = create_test_app_state(None);

    let (status, body) = send(&state, post_json("/paystack-init", &scenario_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server misconfiguration");

    let conn = state.db.get().unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 0, "no order should be created without a gateway");
}

#[tokio::test]
async fn test_init_order_insert_failure_skips_provider() {
    let (state, gateway) = create_test_app_state_with_gateway();
    {
        let conn = state.db.get().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER fail_order_inserts BEFORE INSERT ON orders
             BEGIN SELECT RAISE(ABORT, 'simulated insert failure'); END;",
        )
        .unwrap();
    }

    let (status, body) = send(&state, post_json("/paystack-init", &scenario_body())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Failed to create order");
    assert!(gateway.initialize_calls().is_empty());
}

#[tokio::test]
async fn test_init_provider_rejection_returns_502_with_details() {
    let gateway = Arc::new(FakeGateway::rejecting(json!({
        "status": false,
        "message": "Invalid key"
    })));
    let state = create_test_app_state(Some(gateway.clone()));

    let (status, body) = send(&state, post_json("/paystack-init", &scenario_body())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Failed to initialize Paystack");
    assert_eq!(body["details"]["message"], "Invalid key");

    // The order was written before the provider call and keeps no reference
    let conn = state.db.get().unwrap();
    let orders: Vec<(String, Option<String>)> = conn
        .prepare("SELECT order_number, payment_intent_id FROM orders")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<std::result::Result<_, _>>()
        .unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].1, None);
}

#[tokio::test]
async fn test_init_line_item_failure_does_not_fail_checkout() {
    let (state, gateway) = create_test_app_state_with_gateway();
    {
        let conn = state.db.get().unwrap();
        conn.execute_batch(
            "CREATE TRIGGER fail_item_inserts BEFORE INSERT ON order_items
             BEGIN SELECT RAISE(ABORT, 'simulated item failure'); END;",
        )
        .unwrap();
    }

    let mut body = scenario_body();
    body["items"] = json!([
        { "product": { "id": 1, "price": 5000 }, "quantity": 2 },
        { "product": { "id": 2, "price": 100 }, "quantity": 1 }
    ]);

    let (status, response) = send(&state, post_json("/paystack-init", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(gateway.initialize_calls().len(), 1);

    let order_id = response["order_id"].as_str().unwrap();
    let conn = state.db.get().unwrap();
    assert!(queries::get_order_by_id(&conn, order_id).unwrap().is_some());
    assert!(queries::list_order_items(&conn, order_id).unwrap().is_empty());
}

#[tokio::test]
async fn test_init_get_not_allowed() {
    let (state, _gateway) = create_test_app_state_with_gateway();
    let (status, _) = send(&state, get("/paystack-init")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_cors_preflight_allows_any_origin() {
    let (state, _gateway) = create_test_app_state_with_gateway();

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/paystack-init")
        .header("origin", "https://shop.example.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(axum::body::Body::empty())
        .unwrap();

    let response = tower::ServiceExt::oneshot(app(state), request).await.unwrap();
    assert!(response.status().is_success());
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
}

use chrono::Utc;
use rusqlite::{Connection, params};

use crate::error::Result;
use crate::id::EntityType;
use crate::models::*;

use super::from_row::{
    ORDER_COLS, ORDER_ITEM_COLS, UNMATCHED_PAYMENT_COLS, query_all, query_one,
};

fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Orders ============

pub fn create_order(conn: &Connection, input: &CreateOrder) -> Result<Order> {
    let id = EntityType::Order.gen_id();
    let now = now();
    let totals = &input.totals;
    let shipping_address = serde_json::to_string(&input.shipping_address)?;

    conn.execute(
        "INSERT INTO orders (id, order_number, user_id, guest_email, guest_phone, status, payment_status,
                             currency, subtotal, shipping_cost, tax_amount, discount_amount, total_amount,
                             shipping_address, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?15)",
        params![
            &id,
            &input.order_number,
            &input.user_id,
            &input.guest_email,
            &input.guest_phone,
            OrderStatus::Pending.as_ref(),
            PaymentStatus::Pending.as_ref(),
            &input.currency,
            totals.subtotal,
            totals.shipping_cost,
            totals.tax_amount,
            totals.discount_amount,
            totals.total_amount,
            &shipping_address,
            now,
        ],
    )?;

    Ok(Order {
        id,
        order_number: input.order_number.clone(),
        user_id: input.user_id.clone(),
        guest_email: input.guest_email.clone(),
        guest_phone: input.guest_phone.clone(),
        status: OrderStatus::Pending,
        payment_status: PaymentStatus::Pending,
        payment_method: None,
        payment_intent_id: None,
        currency: input.currency.clone(),
        subtotal: totals.subtotal,
        shipping_cost: totals.shipping_cost,
        tax_amount: totals.tax_amount,
        discount_amount: totals.discount_amount,
        total_amount: totals.total_amount,
        shipping_address: input.shipping_address.clone(),
        created_at: now,
        updated_at: now,
    })
}

pub fn get_order_by_id(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        &[&id],
    )
}

pub fn get_order_by_number(conn: &Connection, order_number: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE order_number = ?1", ORDER_COLS),
        &[&order_number],
    )
}

pub fn get_order_with_items_by_number(
    conn: &Connection,
    order_number: &str,
) -> Result<Option<OrderWithItems>> {
    let Some(order) = get_order_by_number(conn, order_number)? else {
        return Ok(None);
    };
    let items = list_order_items(conn, &order.id)?;
    Ok(Some(OrderWithItems { order, items }))
}

/// Attach the provider reference after a successful initialize call.
/// Returns false if the order no longer exists.
pub fn set_order_payment_reference(conn: &Connection, order_id: &str, reference: &str) -> Result<bool> {
    let affected = conn.execute(
        "UPDATE orders SET payment_intent_id = ?1, updated_at = ?2 WHERE id = ?3",
        params![reference, now(), order_id],
    )?;
    Ok(affected > 0)
}

/// Apply the paid/confirmed field set to every order where `column = value`.
///
/// `column` must be one of the fixed correlation columns. Returns the IDs of
/// the updated orders (empty when nothing matched). The update is a blind
/// overwrite, so applying it twice leaves the same state. Without a reference
/// the stored `payment_intent_id` is kept.
pub fn confirm_order_payment(
    conn: &Connection,
    column: &'static str,
    value: &str,
    confirmation: &PaymentConfirmation,
) -> Result<Vec<String>> {
    let sql = format!(
        "UPDATE orders
         SET payment_status = ?1, status = ?2, payment_method = ?3,
             payment_intent_id = COALESCE(?4, payment_intent_id), updated_at = ?5
         WHERE {} = ?6
         RETURNING id",
        column
    );
    let mut stmt = conn.prepare(&sql)?;
    let ids = stmt
        .query_map(
            params![
                PaymentStatus::Paid.as_ref(),
                OrderStatus::Confirmed.as_ref(),
                &confirmation.channel,
                &confirmation.reference,
                now(),
                value,
            ],
            |row| row.get::<_, String>(0),
        )?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

// ============ Order Items ============

/// Insert all line items for an order in one transaction: all of them or none.
pub fn create_order_items(
    conn: &mut Connection,
    order_id: &str,
    items: &[CreateOrderItem],
) -> Result<Vec<OrderItem>> {
    let now = now();
    let tx = conn.transaction()?;
    let mut created = Vec::with_capacity(items.len());

    {
        let mut stmt = tx.prepare(
            "INSERT INTO order_items (id, order_id, product_id, product_name, product_slug, product_image_url,
                                      color_name, color_hex, size, unit_price, quantity, total_price, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;

        for item in items {
            let id = EntityType::OrderItem.gen_id();
            stmt.execute(params![
                &id,
                order_id,
                &item.product_id,
                &item.product_name,
                &item.product_slug,
                &item.product_image_url,
                &item.color_name,
                &item.color_hex,
                &item.size,
                item.unit_price,
                item.quantity,
                item.total_price,
                now,
            ])?;

            created.push(OrderItem {
                id,
                order_id: order_id.to_string(),
                product_id: item.product_id.clone(),
                product_name: item.product_name.clone(),
                product_slug: item.product_slug.clone(),
                product_image_url: item.product_image_url.clone(),
                color_name: item.color_name.clone(),
                color_hex: item.color_hex.clone(),
                size: item.size.clone(),
                unit_price: item.unit_price,
                quantity: item.quantity,
                total_price: item.total_price,
                created_at: now,
            });
        }
    }

    tx.commit()?;
    Ok(created)
}

pub fn list_order_items(conn: &Connection, order_id: &str) -> Result<Vec<OrderItem>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM order_items WHERE order_id = ?1 ORDER BY created_at, rowid",
            ORDER_ITEM_COLS
        ),
        &[&order_id],
    )
}

// ============ Unmatched Payments ============

pub fn record_unmatched_payment(
    conn: &Connection,
    source: PaymentSource,
    reference: Option<&str>,
    order_hint: Option<&str>,
    payload: Option<&serde_json::Value>,
) -> Result<UnmatchedPayment> {
    let id = EntityType::UnmatchedPayment.gen_id();
    let now = now();
    let payload_json = payload.map(serde_json::to_string).transpose()?;

    conn.execute(
        "INSERT INTO unmatched_payments (id, source, reference, order_hint, payload, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![&id, source.as_ref(), reference, order_hint, &payload_json, now],
    )?;

    Ok(UnmatchedPayment {
        id,
        source,
        reference: reference.map(String::from),
        order_hint: order_hint.map(String::from),
        payload: payload.cloned(),
        created_at: now,
    })
}

pub fn list_unmatched_payments(conn: &Connection) -> Result<Vec<UnmatchedPayment>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM unmatched_payments ORDER BY created_at DESC, rowid DESC",
            UNMATCHED_PAYMENT_COLS
        ),
        &[],
    )
}

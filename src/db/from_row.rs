//! Row mapping trait and helpers for reducing boilerplate in queries.

use rusqlite::{Connection, OptionalExtension, Row, ToSql};

use crate::models::*;

/// Parse a string column into an enum type, converting parse errors to rusqlite errors.
fn parse_enum<T: std::str::FromStr>(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<T> {
    row.get::<_, String>(col)?.parse::<T>().map_err(|_| {
        rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
    })
}

/// Parse a TEXT column holding JSON. Unparseable content maps to a column error.
fn parse_json(row: &Row, col: usize, col_name: &str) -> rusqlite::Result<Option<serde_json::Value>> {
    match row.get::<_, Option<String>>(col)? {
        Some(raw) => serde_json::from_str(&raw).map(Some).map_err(|_| {
            rusqlite::Error::InvalidColumnType(col, col_name.to_string(), rusqlite::types::Type::Text)
        }),
        None => Ok(None),
    }
}

pub trait FromRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Query for a single optional result.
pub fn query_one<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Option<T>> {
    conn.query_row(sql, params, T::from_row)
        .optional()
        .map_err(Into::into)
}

/// Query for multiple results.
pub fn query_all<T: FromRow>(
    conn: &Connection,
    sql: &str,
    params: &[&dyn ToSql],
) -> crate::error::Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, T::from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ============ SQL SELECT Constants ============

pub const ORDER_COLS: &str = "id, order_number, user_id, guest_email, guest_phone, status, payment_status, payment_method, payment_intent_id, currency, subtotal, shipping_cost, tax_amount, discount_amount, total_amount, shipping_address, created_at, updated_at";

pub const ORDER_ITEM_COLS: &str = "id, order_id, product_id, product_name, product_slug, product_image_url, color_name, color_hex, size, unit_price, quantity, total_price, created_at";

pub const UNMATCHED_PAYMENT_COLS: &str = "id, source, reference, order_hint, payload, created_at";

// ============ FromRow Implementations ============

impl FromRow for Order {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Order {
            id: row.get(0)?,
            order_number: row.get(1)?,
            user_id: row.get(2)?,
            guest_email: row.get(3)?,
            guest_phone: row.get(4)?,
            status: parse_enum(row, 5, "status")?,
            payment_status: parse_enum(row, 6, "payment_status")?,
            payment_method: row.get(7)?,
            payment_intent_id: row.get(8)?,
            currency: row.get(9)?,
            subtotal: row.get(10)?,
            shipping_cost: row.get(11)?,
            tax_amount: row.get(12)?,
            discount_amount: row.get(13)?,
            total_amount: row.get(14)?,
            shipping_address: parse_json(row, 15, "shipping_address")?
                .unwrap_or_else(|| serde_json::json!({})),
            created_at: row.get(16)?,
            updated_at: row.get(17)?,
        })
    }
}

impl FromRow for OrderItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(OrderItem {
            id: row.get(0)?,
            order_id: row.get(1)?,
            product_id: row.get(2)?,
            product_name: row.get(3)?,
            product_slug: row.get(4)?,
            product_image_url: row.get(5)?,
            color_name: row.get(6)?,
            color_hex: row.get(7)?,
            size: row.get(8)?,
            unit_price: row.get(9)?,
            quantity: row.get(10)?,
            total_price: row.get(11)?,
            created_at: row.get(12)?,
        })
    }
}

impl FromRow for UnmatchedPayment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(UnmatchedPayment {
            id: row.get(0)?,
            source: parse_enum(row, 1, "source")?,
            reference: row.get(2)?,
            order_hint: row.get(3)?,
            payload: parse_json(row, 4, "payload")?,
            created_at: row.get(5)?,
        })
    }
}

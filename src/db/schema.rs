use rusqlite::Connection;

/// Initialize the database schema. Safe to run on every startup.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA foreign_keys = ON;

        -- Orders (one per checkout attempt)
        -- Amounts are whole currency units; Paystack gets them x100.
        -- user_id and guest_* are mutually exclusive.
        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            order_number TEXT NOT NULL UNIQUE,
            user_id TEXT,
            guest_email TEXT,
            guest_phone TEXT,
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'confirmed')),
            payment_status TEXT NOT NULL DEFAULT 'pending' CHECK (payment_status IN ('pending', 'paid')),
            payment_method TEXT,
            payment_intent_id TEXT,
            currency TEXT NOT NULL,
            subtotal INTEGER NOT NULL CHECK (subtotal >= 0),
            shipping_cost INTEGER NOT NULL CHECK (shipping_cost >= 0),
            tax_amount INTEGER NOT NULL CHECK (tax_amount >= 0),
            discount_amount INTEGER NOT NULL CHECK (discount_amount >= 0),
            total_amount INTEGER NOT NULL CHECK (total_amount >= 0),
            shipping_address TEXT NOT NULL DEFAULT '{}',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL,
            CHECK (user_id IS NULL OR (guest_email IS NULL AND guest_phone IS NULL))
        );
        CREATE INDEX IF NOT EXISTS idx_orders_payment_intent ON orders(payment_intent_id);
        CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

        -- Order line items (product details denormalized at purchase time)
        -- product_id has no FK: the catalog lives elsewhere and products may be deleted.
        CREATE TABLE IF NOT EXISTS order_items (
            id TEXT PRIMARY KEY,
            order_id TEXT NOT NULL REFERENCES orders(id) ON DELETE CASCADE,
            product_id TEXT,
            product_name TEXT NOT NULL,
            product_slug TEXT,
            product_image_url TEXT,
            color_name TEXT,
            color_hex TEXT,
            size TEXT,
            unit_price INTEGER NOT NULL CHECK (unit_price >= 0),
            quantity INTEGER NOT NULL CHECK (quantity >= 1),
            total_price INTEGER NOT NULL CHECK (total_price >= 0),
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);

        -- Successful charges that matched no order (manual reconciliation queue)
        CREATE TABLE IF NOT EXISTS unmatched_payments (
            id TEXT PRIMARY KEY,
            source TEXT NOT NULL CHECK (source IN ('webhook', 'verify')),
            reference TEXT,
            order_hint TEXT,
            payload TEXT,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_unmatched_payments_reference ON unmatched_payments(reference);
        "#,
    )?;
    Ok(())
}

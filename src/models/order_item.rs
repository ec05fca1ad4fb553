use serde::{Deserialize, Serialize};

/// One product line within an order.
///
/// Product details are copied at purchase time so the line survives catalog
/// edits. `product_id` is informational and may be missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: Option<String>,
    pub product_name: String,
    pub product_slug: Option<String>,
    pub product_image_url: Option<String>,
    pub color_name: Option<String>,
    pub color_hex: Option<String>,
    pub size: Option<String>,
    pub unit_price: i64,
    pub quantity: i64,
    pub total_price: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrderItem {
    pub product_id: Option<String>,
    pub product_name: String,
    pub product_slug: Option<String>,
    pub product_image_url: Option<String>,
    pub color_name: Option<String>,
    pub color_hex: Option<String>,
    pub size: Option<String>,
    pub unit_price: i64,
    pub quantity: i64,
    pub total_price: i64,
}

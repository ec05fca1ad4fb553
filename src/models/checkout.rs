//! Checkout request shapes and the validation step that runs before any
//! order is written or any provider call is made.

use serde::Deserialize;

use super::{CreateOrder, CreateOrderItem, OrderTotals};
use crate::error::{AppError, Result, msg};
use crate::util::{round_minor, value_as_string};

/// Upper bound for any single amount. Keeps `total * 100` well inside `i64`.
pub const MAX_AMOUNT: f64 = 1_000_000_000_000.0;

const DEFAULT_PRODUCT_NAME: &str = "Product";

/// Body of `POST /paystack-init`, as sent by the storefront cart.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub shipping_address: Option<serde_json::Value>,
    pub items: Option<Vec<CartItem>>,
    pub totals: Option<CheckoutTotals>,
    pub user_id: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CartItem {
    pub product: Option<CartProduct>,
    #[serde(rename = "selectedColor", alias = "selected_color")]
    pub selected_color: Option<SelectedColor>,
    #[serde(rename = "selectedSize", alias = "selected_size")]
    pub selected_size: Option<String>,
    pub quantity: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CartProduct {
    /// Catalog IDs arrive as numbers or strings depending on the source table
    pub id: Option<serde_json::Value>,
    pub name: Option<String>,
    pub slug: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct SelectedColor {
    pub name: Option<String>,
    pub hex: Option<String>,
    pub images: Option<ColorImages>,
}

#[derive(Debug, Deserialize)]
pub struct ColorImages {
    pub front: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutTotals {
    pub subtotal: Option<f64>,
    pub shipping: Option<f64>,
    pub tax: Option<f64>,
    pub discount: Option<f64>,
    pub total: Option<f64>,
}

/// A checkout request that passed validation. Amounts are rounded.
#[derive(Debug, Clone)]
pub struct ValidatedCheckout {
    pub email: String,
    pub phone: Option<String>,
    pub user_id: Option<String>,
    pub currency: String,
    pub shipping_address: serde_json::Value,
    pub totals: OrderTotals,
    pub items: Vec<CreateOrderItem>,
}

impl CheckoutRequest {
    pub fn validate(self, default_currency: &str) -> Result<ValidatedCheckout> {
        let email = non_blank(self.email);
        let items = self.items.filter(|items| !items.is_empty());
        let (Some(email), Some(items), Some(totals)) = (email, items, self.totals) else {
            return Err(AppError::BadRequest(msg::MISSING_REQUIRED_FIELDS.into()));
        };

        if !looks_like_email(&email) {
            return Err(AppError::BadRequest(msg::INVALID_EMAIL.into()));
        }

        let currency = match non_blank(self.currency) {
            Some(c) => normalize_currency(&c)?,
            None => default_currency.to_uppercase(),
        };

        let totals = totals.rounded()?;
        let items = items
            .into_iter()
            .map(CartItem::into_order_item)
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidatedCheckout {
            email,
            phone: non_blank(self.phone),
            user_id: non_blank(self.user_id),
            currency,
            shipping_address: match self.shipping_address {
                Some(serde_json::Value::Null) | None => serde_json::json!({}),
                Some(address) => address,
            },
            totals,
            items,
        })
    }
}

impl ValidatedCheckout {
    /// Authenticated customers are referenced by ID only; guests by contact details.
    pub fn to_create_order(&self, order_number: String) -> CreateOrder {
        let (guest_email, guest_phone) = match self.user_id {
            Some(_) => (None, None),
            None => (Some(self.email.clone()), self.phone.clone()),
        };

        CreateOrder {
            order_number,
            user_id: self.user_id.clone(),
            guest_email,
            guest_phone,
            currency: self.currency.clone(),
            totals: self.totals,
            shipping_address: self.shipping_address.clone(),
        }
    }
}

impl CheckoutTotals {
    /// Round every component. An absent or zero `total` is computed from the
    /// rounded parts.
    pub fn rounded(&self) -> Result<OrderTotals> {
        let mut totals = OrderTotals {
            subtotal: amount(self.subtotal)?,
            shipping_cost: amount(self.shipping)?,
            tax_amount: amount(self.tax)?,
            discount_amount: amount(self.discount)?,
            total_amount: 0,
        };

        let computed = totals.computed_total();
        totals.total_amount = match self.total {
            Some(total) if total != 0.0 => {
                let explicit = amount(Some(total))?;
                if explicit != computed {
                    tracing::warn!(
                        "Checkout total {} differs from computed total {}; keeping caller's total",
                        explicit,
                        computed
                    );
                }
                explicit
            }
            _ => computed,
        };

        if totals.total_amount < 0 {
            return Err(AppError::BadRequest(msg::NEGATIVE_TOTAL.into()));
        }

        Ok(totals)
    }
}

impl CartItem {
    fn into_order_item(self) -> Result<CreateOrderItem> {
        let raw_quantity = self.quantity.unwrap_or(1.0);
        if !raw_quantity.is_finite() || raw_quantity > MAX_AMOUNT {
            return Err(AppError::BadRequest(msg::INVALID_QUANTITY.into()));
        }
        let quantity = round_minor(raw_quantity);
        if quantity < 1 {
            return Err(AppError::BadRequest(msg::INVALID_QUANTITY.into()));
        }

        let product = self.product;
        let raw_price = product.as_ref().and_then(|p| p.price).unwrap_or(0.0);
        let unit_price = amount(Some(raw_price))?;
        let line_total = raw_price * raw_quantity;
        if line_total > MAX_AMOUNT {
            return Err(AppError::BadRequest(msg::AMOUNT_TOO_LARGE.into()));
        }

        let (product_id, product_name, product_slug) = match product {
            Some(p) => (
                p.id.as_ref().and_then(value_as_string),
                non_blank(p.name).unwrap_or_else(|| DEFAULT_PRODUCT_NAME.to_string()),
                non_blank(p.slug),
            ),
            None => (None, DEFAULT_PRODUCT_NAME.to_string(), None),
        };

        let (color_name, color_hex, product_image_url) = match self.selected_color {
            Some(color) => (
                non_blank(color.name),
                non_blank(color.hex),
                non_blank(color.images.and_then(|images| images.front)),
            ),
            None => (None, None, None),
        };

        Ok(CreateOrderItem {
            product_id,
            product_name,
            product_slug,
            product_image_url,
            color_name,
            color_hex,
            size: non_blank(self.selected_size),
            unit_price,
            quantity,
            total_price: round_minor(line_total),
        })
    }
}

fn amount(value: Option<f64>) -> Result<i64> {
    let value = value.unwrap_or(0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::BadRequest(msg::NEGATIVE_AMOUNT.into()));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::BadRequest(msg::AMOUNT_TOO_LARGE.into()));
    }
    Ok(round_minor(value))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

fn normalize_currency(code: &str) -> Result<String> {
    if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code.to_ascii_uppercase())
    } else {
        Err(AppError::BadRequest(msg::INVALID_CURRENCY.into()))
    }
}

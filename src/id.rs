//! ID and order number generation.
//!
//! Internal IDs use an `sf_` prefix so they can never be confused with
//! Paystack references or customer-facing order numbers.
//!
//! Format: `sf_{entity}_{uuid_simple}` (32 hex chars, no hyphens)

use rand::Rng;
use uuid::Uuid;

const ALL_PREFIXES: &[&str] = &["sf_ord_", "sf_item_", "sf_unm_"];

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ORDER_NUMBER_RANDOM_LEN: usize = 9;

/// Cheap format check used to skip lookups for garbage IDs.
pub fn is_valid_prefixed_id(s: &str) -> bool {
    let Some(prefix) = ALL_PREFIXES.iter().find(|p| s.starts_with(*p)) else {
        return false;
    };

    let hex_part = &s[prefix.len()..];
    hex_part.len() == 32 && hex_part.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Debug, Clone, Copy)]
pub enum EntityType {
    Order,
    OrderItem,
    UnmatchedPayment,
}

impl EntityType {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Order => "sf_ord",
            Self::OrderItem => "sf_item",
            Self::UnmatchedPayment => "sf_unm",
        }
    }

    pub fn gen_id(&self) -> String {
        format!("{}_{}", self.prefix(), Uuid::new_v4().as_simple())
    }
}

/// Customer-facing order number: `{PREFIX}-{unix_millis}-{9 base-36 chars}`.
pub fn generate_order_number(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let mut rng = rand::thread_rng();
    let random: String = (0..ORDER_NUMBER_RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}", prefix, millis, random)
}

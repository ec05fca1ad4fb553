//! Shared helpers: money rounding and request-derived URLs.

use axum::http::HeaderMap;

/// Paystack expects amounts in the currency's subunit (kobo, pesewas, cents).
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Round to the nearest whole unit, halves away from zero.
pub fn round_minor(value: f64) -> i64 {
    value.round() as i64
}

/// Convert a whole-unit amount into the provider's subunit. `None` on overflow.
pub fn to_minor_units(amount: i64) -> Option<i64> {
    amount.checked_mul(MINOR_UNITS_PER_MAJOR)
}

/// Read a JSON scalar as a string. Provider metadata and catalog IDs mix
/// numbers and strings.
pub fn value_as_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Base URL the shopper's browser should come back to.
///
/// Priority: explicit override, then `x-forwarded-proto` + `host` headers,
/// then the service's own base URL.
pub fn callback_base_url(headers: &HeaderMap, override_base: Option<&str>, fallback: &str) -> String {
    if let Some(base) = override_base {
        return base.trim_end_matches('/').to_string();
    }

    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    match header("host") {
        Some(host) => {
            // Proxies may send a list ("https,http"); the first hop is the client's
            let proto = header("x-forwarded-proto")
                .and_then(|p| p.split(',').next())
                .map(str::trim)
                .unwrap_or("http");
            format!("{}://{}", proto, host)
        }
        None => fallback.trim_end_matches('/').to_string(),
    }
}

pub fn checkout_callback_url(base: &str) -> String {
    format!("{}/checkout/callback", base)
}

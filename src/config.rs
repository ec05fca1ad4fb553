use std::env;

pub const DEFAULT_PAYSTACK_API_BASE: &str = "https://api.paystack.co";
pub const DEFAULT_CURRENCY: &str = "NGN";
pub const DEFAULT_ORDER_NUMBER_PREFIX: &str = "FF";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Public URL of this service, last resort for building callback URLs
    pub base_url: String,
    /// Paystack secret key. Used for API auth and webhook signatures.
    /// Payment endpoints answer 500 when this is missing.
    pub paystack_secret_key: Option<String>,
    pub paystack_api_base: String,
    /// Explicit callback base (e.g. https://shop.example.com), wins over request headers
    pub callback_url_base: Option<String>,
    pub default_currency: String,
    pub order_number_prefix: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let base_url = env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port));

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "storefront.db".to_string()),
            base_url,
            paystack_secret_key: non_empty_var("PAYSTACK_SECRET_KEY"),
            paystack_api_base: non_empty_var("PAYSTACK_API_BASE")
                .unwrap_or_else(|| DEFAULT_PAYSTACK_API_BASE.to_string()),
            callback_url_base: non_empty_var("PAYSTACK_CALLBACK_URL_BASE"),
            default_currency: non_empty_var("DEFAULT_CURRENCY")
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            order_number_prefix: non_empty_var("ORDER_NUMBER_PREFIX")
                .unwrap_or_else(|| DEFAULT_ORDER_NUMBER_PREFIX.to_string()),
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Treat empty variables the same as unset ones (`PAYSTACK_SECRET_KEY=` in a .env file).
fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::error::{AppError, Result};
use crate::payments::PaymentGateway;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Payment provider client, built once at startup.
    /// `None` when no secret key is configured.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
    /// Base URL of this service (last-resort callback base)
    pub base_url: String,
    /// Explicit callback base that wins over request headers
    pub callback_url_base: Option<String>,
    pub default_currency: String,
    pub order_number_prefix: String,
}

impl AppState {
    /// The configured gateway, or a misconfiguration error.
    pub fn gateway(&self) -> Result<Arc<dyn PaymentGateway>> {
        self.gateway
            .clone()
            .ok_or_else(|| AppError::Misconfigured("PAYSTACK_SECRET_KEY missing".into()))
    }
}

fn manager_with_pragmas(manager: SqliteConnectionManager) -> SqliteConnectionManager {
    manager.with_init(|conn| conn.execute_batch("PRAGMA foreign_keys = ON;"))
}

pub fn create_pool(database_path: &str) -> std::result::Result<DbPool, r2d2::Error> {
    let manager = manager_with_pragmas(SqliteConnectionManager::file(database_path));
    Pool::builder().max_size(10).build(manager)
}

/// Single-connection in-memory pool. Each SQLite memory connection is its own
/// database, so the pool must never open a second one.
pub fn create_memory_pool() -> std::result::Result<DbPool, r2d2::Error> {
    let manager = manager_with_pragmas(SqliteConnectionManager::memory());
    Pool::builder().max_size(1).build(manager)
}

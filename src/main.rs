use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront::config::Config;
use storefront::db::{AppState, create_pool, init_db, queries};
use storefront::handlers;
use storefront::payments::{PaymentGateway, PaystackClient};

#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Storefront checkout and Paystack payment reconciliation")]
struct Cli {
    /// Print payments that could not be matched to an order, then exit
    #[arg(long)]
    list_unmatched: bool,

    /// Delete the database on exit (useful for fresh local runs)
    #[arg(long)]
    ephemeral: bool,
}

fn list_unmatched(state: &AppState) {
    let conn = state.db.get().expect("Failed to get db connection");
    let payments = queries::list_unmatched_payments(&conn).expect("Failed to list unmatched payments");

    if payments.is_empty() {
        println!("No unmatched payments.");
        return;
    }

    println!("{} unmatched payment(s):", payments.len());
    for payment in payments {
        let at = chrono::DateTime::from_timestamp(payment.created_at, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| payment.created_at.to_string());
        println!(
            "  {}  {:<7}  reference={}  hint={}",
            at,
            payment.source.as_ref(),
            payment.reference.as_deref().unwrap_or("-"),
            payment.order_hint.as_deref().unwrap_or("-"),
        );
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "storefront=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    let db_pool = create_pool(&config.database_path).expect("Failed to create database pool");
    {
        let conn = db_pool.get().expect("Failed to get connection");
        init_db(&conn).expect("Failed to initialize database");
    }

    let gateway: Option<Arc<dyn PaymentGateway>> = match &config.paystack_secret_key {
        Some(secret) => Some(Arc::new(PaystackClient::new(
            secret.as_str(),
            config.paystack_api_base.as_str(),
        ))),
        None => {
            tracing::warn!("PAYSTACK_SECRET_KEY not set; payment endpoints will answer 500");
            None
        }
    };

    let state = AppState {
        db: db_pool,
        gateway,
        base_url: config.base_url.clone(),
        callback_url_base: config.callback_url_base.clone(),
        default_currency: config.default_currency.clone(),
        order_number_prefix: config.order_number_prefix.clone(),
    };

    if cli.list_unmatched {
        list_unmatched(&state);
        return;
    }

    let app = handlers::app(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    let db_path = config.database_path.clone();
    if cli.ephemeral {
        tracing::info!("EPHEMERAL MODE: {} will be deleted on exit", db_path);
    }

    tracing::info!("Storefront server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Failed to start server");

    if cli.ephemeral {
        tracing::info!("Cleaning up ephemeral database...");
        if let Err(e) = std::fs::remove_file(&db_path) {
            tracing::warn!("Failed to remove {}: {}", db_path, e);
        } else {
            tracing::info!("Removed {}", db_path);
        }
        let _ = std::fs::remove_file(format!("{}-wal", db_path));
        let _ = std::fs::remove_file(format!("{}-shm", db_path));
    }
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

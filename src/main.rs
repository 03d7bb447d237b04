use console_router::{
    AccessLevel, AppState, InMemorySessionStore, SessionState,
    config::{AppConfig, Env},
    create_router, sitemap,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, validates the route table and serves the
/// console.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise verbose defaults for local work.
    // Pretty output for humans in local mode, JSON for log shippers in production.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "console_router=debug,tower_http=info,axum=trace".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 3. Route table. A malformed table is a configuration error and stops startup.
    let table = match sitemap::console_table(&config.base_path) {
        Ok(table) => table,
        Err(e) => {
            tracing::error!(error = %e, "route table rejected");
            std::process::exit(1);
        }
    };
    tracing::info!(routes = table.len(), base = %table.base_path(), "route table loaded");

    // 4. Sessions. Seeded admins are a local convenience only.
    let sessions = Arc::new(InMemorySessionStore::new());
    if config.env == Env::Local {
        for admin in &config.admin_ids {
            sessions.login(*admin, AccessLevel::Admin, None).await;
        }
    }

    // Assemble the unified state; the guard's redirect follows the table's base path.
    let bind_addr = config.bind_addr.clone();
    let app_state = AppState::new(table, sessions as SessionState, config);
    let app = create_router(app_state);

    // 5. Serve.
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: Failed to bind listener. Check CONSOLE_BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly");
}

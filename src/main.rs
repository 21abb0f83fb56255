// src/main.rs

use std::net::SocketAddr;
use std::time::Duration;

use testprep::config::Config;
use testprep::routes;
use testprep::services::bootstrap;
use testprep::state::AppState;
use testprep::db;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load configuration from environment (.env included)
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    // Initialize Tracing (Logging)
    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    if config.uses_default_secret() {
        tracing::warn!("SECRET_KEY is not set, sessions are signed with the development key");
    }

    // Open the store with a short retry
    let mut retry_count = 0;
    let pool = loop {
        match db::connect(&config.database_url).await {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    tracing::error!("Failed to open database after 5 retries: {}", e);
                    return;
                }
                tracing::warn!(
                    "Database not ready, retrying in 2s... (Attempt {})",
                    retry_count
                );
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };

    tracing::info!("Database connected: {}", config.database_url);

    // Bootstrap failures are logged and the server starts anyway.
    match db::migrate(&pool).await {
        Ok(()) => {
            tracing::info!("Migrations applied successfully.");

            if let Err(e) = bootstrap::seed_if_empty(&pool, &config.data_dir).await {
                tracing::error!("Error seeding database: {}", e);
            }

            if let Some(seed) = &config.seed_user {
                if let Err(e) = bootstrap::seed_user(&pool, seed).await {
                    tracing::error!("Failed to seed user: {}", e);
                }
            }
        }
        Err(e) => tracing::error!("Failed to run database migrations: {}", e),
    }

    let state = AppState {
        pool,
        config: config.clone(),
    };

    let app = routes::create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            return;
        }
    };

    tracing::info!("Listening on {}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

use reunion_hub::{
    api::{self, AppState},
    config::{self, bootstrap::ensure_bootstrap_admin, database},
    errors::Result,
    services::{LocalObjectStore, mailer},
};
use dotenvy::dotenv;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load the main application configuration
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. Connect and create tables
    let db = database::create_connection(&app_config)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to initialize database: {}", e))?;

    // 5. Seed the bootstrap super-admin (if configured)
    ensure_bootstrap_admin(&db, &app_config)
        .await
        .inspect_err(|e| error!("Failed to seed bootstrap admin: {}", e))?;

    // 6. Wire collaborators and serve
    let state = AppState {
        mailer: mailer::from_config(&app_config.mail)?,
        storage: Arc::new(LocalObjectStore::new(&app_config.uploads)),
        config: Arc::new(app_config),
        db: Arc::new(db),
    };

    let listener = tokio::net::TcpListener::bind(&state.config.server.bind)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", state.config.server.bind, e))?;
    info!("Listening on {}", state.config.server.bind);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
}

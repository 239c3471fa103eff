use anyhow::{Context, Result};
use axum::Router;
use config::Mode;
use rand::{SeedableRng, rngs::StdRng};
use services::{AppState, seed::Seeder, sqlite_store::SqliteStore};
use std::{io::ErrorKind, path::Path, sync::Arc};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod config;
mod errors;
mod handlers;
mod models;
mod routes;
mod services;

#[tokio::main]
async fn main() -> Result<()> {
    // --- Logging setup ---
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // --- Parse config + run mode ---
    let (cfg, mode) = config::AppConfig::from_env_and_args()?;

    tracing::info!("Starting event-booking with config: {:?}", cfg);

    // --- Ensure the database directory exists ---
    let db_path = cfg
        .database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .trim_start_matches("file:");
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created missing directory {:?}", parent);
        }
    }

    // --- Initialize SQLite store ---
    let store = SqliteStore::connect(&cfg.database_url, 5).await?;
    let statements = store.migrate().await?;
    tracing::info!("Applied {} schema statements", statements);

    let state = AppState::new(Arc::new(store), cfg.per_page);

    match mode {
        Mode::Migrate => {
            tracing::info!("Database migration complete.");
            return Ok(());
        }
        Mode::Seed => {
            let seeder = Seeder::new(
                state.events.clone(),
                state.attendees.clone(),
                state.bookings.clone(),
            );
            let summary = seeder
                .run(&mut StdRng::from_entropy())
                .await
                .context("seeding failed")?;
            tracing::info!("Seeding complete: {:?}", summary);
            return Ok(());
        }
        Mode::Serve => {}
    }

    // --- Build router ---
    let app: Router = routes::routes::routes().with_state(state);

    // --- Start server ---
    let addr = cfg.addr();
    let listener = match TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(err)
            if err.kind() == ErrorKind::PermissionDenied
                && matches!(cfg.host.as_str(), "0.0.0.0" | "::") =>
        {
            let fallback_addr = format!("127.0.0.1:{}", cfg.port);
            tracing::warn!(
                "Permission denied binding to {} ({}). Falling back to {}",
                addr,
                err,
                fallback_addr
            );
            TcpListener::bind(&fallback_addr).await?
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!("Server listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

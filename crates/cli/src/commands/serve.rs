use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use medassist_http::{AppState, create_router};
use medassist_service::{PriceReportService, StrategyService};
use medassist_storage::{MemoryStorage, StorageBackend};

use crate::database_url;

async fn open_storage(fixtures: Option<&Path>) -> Result<StorageBackend> {
    if let Some(url) = database_url() {
        if fixtures.is_some() {
            tracing::warn!("--fixtures is ignored when DATABASE_URL is set");
        }
        let backend = StorageBackend::new_postgres(&url).await?;
        tracing::info!("Connected to PostgreSQL");
        return Ok(backend);
    }

    let storage = match fixtures {
        Some(path) => {
            let storage = MemoryStorage::from_fixture_file(path)?;
            tracing::info!(path = %path.display(), "Loaded fixtures into in-memory storage");
            storage
        },
        None => {
            tracing::warn!("DATABASE_URL not set, using empty in-memory storage");
            MemoryStorage::new()
        },
    };
    Ok(StorageBackend::Memory(storage))
}

pub(crate) async fn run(port: u16, host: String, fixtures: Option<&Path>) -> Result<()> {
    let storage = Arc::new(open_storage(fixtures).await?);
    let state = Arc::new(AppState {
        strategy_service: Arc::new(StrategyService::new(storage.clone())),
        price_report_service: Arc::new(PriceReportService::new(storage.clone())),
        backend: storage.kind(),
    });

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

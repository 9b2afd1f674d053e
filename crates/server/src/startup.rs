use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use configs::AppConfig;
use models::db::{connect_with_config, test_connection, DatabaseConfig};
use service::repo::SeaOrmRepository;
use service::storage::{HttpObjectStore, ObjectStore};

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {e}", cfg.server.host, cfg.server.port)))
}

/// Connect the database and object store, then serve until a shutdown signal.
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let addr = bind_addr(&cfg)?;

    let db = connect_with_config(&DatabaseConfig::from(&cfg.database)).await?;
    test_connection(&db).await?;
    migration::Migrator::up(&db, None).await?;
    info!(event = "migrations_applied", "database schema up to date");

    let repo = Arc::new(SeaOrmRepository::new(db.clone()));
    let store: Arc<dyn ObjectStore> = Arc::new(HttpObjectStore::new(&cfg.storage)?);
    let state = ServerState::new(
        repo.clone(),
        repo,
        store,
        cfg.auth.jwt_secret.clone(),
        cfg.server.expose_error_details(),
    );
    if state.auth.is_none() {
        info!("auth.jwt_secret unset; bearer tokens are not verified here");
    }

    let app: Router = routes::build_router(state, build_cors());

    info!(%addr, environment = %cfg.server.environment, bucket = %cfg.storage.bucket, "starting server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(common::shutdown::shutdown_signal())
        .await?;

    db.close().await?;
    info!(event = "db_closed", "database pool closed");
    Ok(())
}

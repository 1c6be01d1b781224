//! Handon - volunteering platform backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use handon::{
    api::{self, AppState},
    cache::create_cache,
    config::Config,
    db::{
        self,
        repositories::{
            SqlxCampaignRepository, SqlxCatalogRepository, SqlxEventRepository,
            SqlxSessionRepository, SqlxUserRepository,
        },
    },
    services::{CampaignService, CatalogService, EventService, SessionService, UserService},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "handon=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Handon...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {:?}", config.database.driver);

    db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed");

    let cache = create_cache(&config.cache);
    tracing::info!(ttl_seconds = config.cache.ttl_seconds, "Cache initialized");

    // Create repositories
    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let campaign_repo = SqlxCampaignRepository::boxed(pool.clone());
    let session_repo = SqlxSessionRepository::boxed(pool.clone());
    let event_repo = SqlxEventRepository::boxed(pool.clone());
    let catalog_repo = SqlxCatalogRepository::boxed(pool.clone());

    // Initialize services
    let session_service = Arc::new(SessionService::new(
        session_repo.clone(),
        user_repo.clone(),
        campaign_repo.clone(),
        cache.clone(),
    ));
    let campaign_service = Arc::new(CampaignService::new(
        campaign_repo,
        user_repo.clone(),
        session_repo.clone(),
        cache.clone(),
    ));
    let user_service = Arc::new(UserService::new(
        user_repo.clone(),
        session_repo,
        catalog_repo.clone(),
    ));
    let event_service = Arc::new(EventService::new(event_repo, user_repo, catalog_repo.clone()));
    let catalog_service = Arc::new(CatalogService::new(catalog_repo, cache));

    let state = AppState {
        pool: pool.clone(),
        session_service,
        campaign_service,
        user_service,
        event_service,
        catalog_service,
    };

    // Build router
    let app = api::build_router(state, &config.server.cors_origin)?;

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

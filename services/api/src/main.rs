use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

mod config;
mod error;
mod gateway;
mod jwt;
mod mailer;
mod middleware;
mod models;
mod money;
mod payouts;
mod repositories;
mod routes;
mod state;
mod storage;
mod streaming;
mod validation;

use common::database::{DatabaseConfig, init_pool};
use common::error::DatabaseError;

use crate::{
    config::{GatewayConfig, MailConfig, ServerConfig, StorageConfig, StreamingConfig},
    gateway::GatewayClient,
    jwt::{JwtConfig, JwtService},
    mailer::Mailer,
    payouts::PayoutService,
    repositories::{
        AnalyticsRepository, CartRepository, CatalogRepository, NewsletterRepository,
        PayoutRepository, UserRepository,
    },
    state::AppState,
    storage::StorageClient,
    streaming::StreamingClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting Wavehouse API service");

    // Initialize database connection pool and apply schema migrations
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    // Configuration is read once here; nothing re-reads the environment
    // after startup.
    let server_config = ServerConfig::from_env()?;
    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let gateway = GatewayClient::new(&GatewayConfig::from_env()?)?;
    let streaming = StreamingClient::new(&StreamingConfig::from_env()?)?;
    let mailer = Mailer::new(&MailConfig::from_env()?)?;
    let storage = StorageClient::new(&StorageConfig::from_env()?).await;

    // Initialize repositories
    let user_repository = UserRepository::new(pool.clone());
    let payout_repository = PayoutRepository::new(pool.clone());
    let catalog_repository = CatalogRepository::new(pool.clone());
    let cart_repository = CartRepository::new(pool.clone());
    let analytics_repository = AnalyticsRepository::new(pool.clone());
    let newsletter_repository = NewsletterRepository::new(pool.clone());

    let payout_service = PayoutService::new(
        user_repository.clone(),
        payout_repository.clone(),
        gateway.clone(),
    );

    let app_state = AppState {
        db_pool: pool,
        jwt_service,
        user_repository,
        payout_repository,
        catalog_repository,
        cart_repository,
        analytics_repository,
        newsletter_repository,
        payout_service,
        gateway,
        streaming,
        mailer,
        storage,
    };

    // Start the web server
    let app = routes::create_router(app_state);

    let addr = format!("0.0.0.0:{}", server_config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Wavehouse API listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

//! Application state shared across handlers
//!
//! Built once in `main`; everything here is a cheap clone handle and nothing
//! is mutated after startup.

use sqlx::PgPool;

use crate::gateway::GatewayClient;
use crate::jwt::JwtService;
use crate::mailer::Mailer;
use crate::payouts::PayoutService;
use crate::repositories::{
    AnalyticsRepository, CartRepository, CatalogRepository, NewsletterRepository,
    PayoutRepository, UserRepository,
};
use crate::storage::StorageClient;
use crate::streaming::StreamingClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub user_repository: UserRepository,
    pub payout_repository: PayoutRepository,
    pub catalog_repository: CatalogRepository,
    pub cart_repository: CartRepository,
    pub analytics_repository: AnalyticsRepository,
    pub newsletter_repository: NewsletterRepository,
    pub payout_service: PayoutService,
    pub gateway: GatewayClient,
    pub streaming: StreamingClient,
    pub mailer: Mailer,
    pub storage: StorageClient,
}

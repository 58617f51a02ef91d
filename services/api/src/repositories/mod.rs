//! Repositories: one per entity family, all `Clone` handles over the pool

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod newsletter;
pub mod payout;
pub mod user;

pub use analytics::AnalyticsRepository;
pub use cart::CartRepository;
pub use catalog::CatalogRepository;
pub use newsletter::NewsletterRepository;
pub use payout::PayoutRepository;
pub use user::UserRepository;

//! Persisted entities and request/response payloads

pub mod analytics;
pub mod cart;
pub mod catalog;
pub mod newsletter;
pub mod payout;
pub mod user;

//! Newsletter subscriber and contact-form payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Newsletter subscriber; email is unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Subscriber {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Subscribe/unsubscribe payload.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub email: String,
}

/// Broadcast payload sent to every subscriber.
#[derive(Debug, Deserialize)]
pub struct SendNewsletterRequest {
    pub subject: String,
    pub body_html: String,
}

/// Contact-form payload relayed to the support inbox.
#[derive(Debug, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

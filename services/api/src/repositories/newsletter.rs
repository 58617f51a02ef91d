//! Newsletter subscriber repository

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::newsletter::Subscriber;

/// Newsletter repository
#[derive(Clone)]
pub struct NewsletterRepository {
    pool: PgPool,
}

impl NewsletterRepository {
    /// Create a new newsletter repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe an email; re-subscribing is a no-op returning the row.
    pub async fn subscribe(&self, email: &str) -> Result<Subscriber> {
        info!("Subscribing {} to the newsletter", email);

        let subscriber = sqlx::query_as::<_, Subscriber>(
            r#"
            INSERT INTO newsletter_subscribers (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(subscriber)
    }

    /// Remove a subscription.
    pub async fn unsubscribe(&self, email: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM newsletter_subscribers WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// All subscriber addresses.
    pub async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
        let subscribers = sqlx::query_as::<_, Subscriber>(
            "SELECT * FROM newsletter_subscribers ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(subscribers)
    }
}

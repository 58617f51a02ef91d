//! Analytics repository: fact rows and SQL aggregation

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::analytics::{AnalyticsTotals, MonthlyStreams, StreamFact};

/// New fact row before insertion.
#[derive(Debug, Clone)]
pub struct NewStreamFact {
    pub email: String,
    pub artist_id: String,
    pub song_title: String,
    pub streams: i64,
    pub stream_time_secs: i64,
    pub revenue_minor: i64,
    pub store: Option<String>,
    pub country: Option<String>,
}

/// Analytics repository
#[derive(Clone)]
pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    /// Create a new analytics repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist one fact row.
    pub async fn insert_fact(&self, fact: &NewStreamFact) -> Result<StreamFact> {
        let row = sqlx::query_as::<_, StreamFact>(
            r#"
            INSERT INTO stream_facts (
                email, artist_id, song_title, streams, stream_time_secs,
                revenue_minor, store, country
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&fact.email)
        .bind(&fact.artist_id)
        .bind(&fact.song_title)
        .bind(fact.streams)
        .bind(fact.stream_time_secs)
        .bind(fact.revenue_minor)
        .bind(&fact.store)
        .bind(&fact.country)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    /// Persist a batch of fact rows, returning them in insertion order.
    pub async fn insert_facts(&self, facts: &[NewStreamFact]) -> Result<Vec<StreamFact>> {
        info!("Persisting {} analytics fact rows", facts.len());

        let mut rows = Vec::with_capacity(facts.len());
        for fact in facts {
            rows.push(self.insert_fact(fact).await?);
        }
        Ok(rows)
    }

    /// Summed totals for an email (and optionally one artist).
    ///
    /// Returns `None` when the scope matches zero rows.
    pub async fn totals(
        &self,
        email: &str,
        artist_id: Option<&str>,
    ) -> Result<Option<AnalyticsTotals>> {
        let totals = sqlx::query_as::<_, AnalyticsTotals>(
            r#"
            SELECT COALESCE(SUM(streams), 0)::BIGINT AS total_streams,
                   COALESCE(SUM(stream_time_secs), 0)::BIGINT AS total_stream_time_secs,
                   COALESCE(SUM(revenue_minor), 0)::BIGINT AS total_revenue_minor,
                   COUNT(*) AS row_count
            FROM stream_facts
            WHERE email = $1 AND ($2::TEXT IS NULL OR artist_id = $2)
            "#,
        )
        .bind(email)
        .bind(artist_id)
        .fetch_one(&self.pool)
        .await?;

        if totals.row_count == 0 {
            return Ok(None);
        }
        Ok(Some(totals))
    }

    /// Streams and revenue bucketed by calendar month, oldest first.
    pub async fn streams_per_month(
        &self,
        email: &str,
        artist_id: Option<&str>,
    ) -> Result<Vec<MonthlyStreams>> {
        let buckets = sqlx::query_as::<_, MonthlyStreams>(
            r#"
            SELECT date_trunc('month', recorded_at) AS month,
                   COALESCE(SUM(streams), 0)::BIGINT AS streams,
                   COALESCE(SUM(revenue_minor), 0)::BIGINT AS revenue_minor
            FROM stream_facts
            WHERE email = $1 AND ($2::TEXT IS NULL OR artist_id = $2)
            GROUP BY 1
            ORDER BY 1
            "#,
        )
        .bind(email)
        .bind(artist_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(buckets)
    }

    /// Raw fact rows for an email, newest first.
    pub async fn list_facts(&self, email: &str) -> Result<Vec<StreamFact>> {
        let rows = sqlx::query_as::<_, StreamFact>(
            "SELECT * FROM stream_facts WHERE email = $1 ORDER BY recorded_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

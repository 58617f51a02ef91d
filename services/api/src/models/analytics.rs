//! Streaming analytics fact rows and aggregate views

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Flat analytics fact row, one per (track, capture).
///
/// Ingested rows carry zeroed streams/revenue because the streaming API does
/// not expose those figures; manual saves may carry real values.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StreamFact {
    pub id: Uuid,
    pub email: String,
    pub artist_id: String,
    pub song_title: String,
    pub streams: i64,
    pub stream_time_secs: i64,
    pub revenue_minor: i64,
    pub store: Option<String>,
    pub country: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Payload for manually saving a fact row.
#[derive(Debug, Deserialize)]
pub struct SaveFactRequest {
    pub artist_id: String,
    pub song_title: String,
    #[serde(default)]
    pub streams: i64,
    #[serde(default)]
    pub stream_time_secs: i64,
    #[serde(default)]
    pub revenue_minor: i64,
    pub store: Option<String>,
    pub country: Option<String>,
}

/// Summed totals over a scope of fact rows.
#[derive(Debug, Serialize, FromRow)]
pub struct AnalyticsTotals {
    pub total_streams: i64,
    pub total_stream_time_secs: i64,
    pub total_revenue_minor: i64,
    pub row_count: i64,
}

/// Streams bucketed by calendar month.
#[derive(Debug, Serialize, FromRow)]
pub struct MonthlyStreams {
    pub month: DateTime<Utc>,
    pub streams: i64,
    pub revenue_minor: i64,
}

/// Query parameters for the aggregation endpoints.
#[derive(Debug, Deserialize)]
pub struct AnalyticsScope {
    pub artist_id: Option<String>,
}

//! Streaming analytics routes: ingestion and aggregation

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::error;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::analytics::{AnalyticsScope, SaveFactRequest},
    repositories::analytics::NewStreamFact,
    state::AppState,
    streaming::StreamingError,
};

impl From<StreamingError> for ApiError {
    fn from(err: StreamingError) -> Self {
        match err {
            StreamingError::Api { status, body } => ApiError::Upstream { status, body },
            StreamingError::TokenExchange(detail) => {
                error!("Streaming token exchange failed: {}", detail);
                ApiError::Upstream {
                    status: 502,
                    body: "streaming API credential exchange failed".to_string(),
                }
            }
            StreamingError::Transport(e) => {
                error!("Streaming API transport failure: {}", e);
                ApiError::Upstream {
                    status: 502,
                    body: "streaming API unreachable".to_string(),
                }
            }
        }
    }
}

/// Artist search query.
#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/analytics/ingest/:artist_id", post(ingest_top_tracks))
        .route("/api/analytics/save", post(save_fact))
        .route("/api/analytics/totals", get(totals))
        .route("/api/analytics/monthly", get(streams_per_month))
        .route("/api/analytics/facts", get(list_facts))
        .route("/api/analytics/artists/search", get(search_artists))
}

/// Pull an artist's top tracks from the streaming platform and persist one
/// fact row per track.
///
/// The platform does not expose stream counts or revenue, so those columns
/// are zeroed on ingested rows.
pub async fn ingest_top_tracks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(artist_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let tracks = state.streaming.artist_top_tracks(&artist_id).await?;

    if tracks.is_empty() {
        return Err(ApiError::NotFound("Tracks"));
    }

    let facts: Vec<NewStreamFact> = tracks
        .into_iter()
        .map(|track| NewStreamFact {
            email: auth.email.clone(),
            artist_id: artist_id.clone(),
            song_title: track.name,
            streams: 0,
            stream_time_secs: 0,
            revenue_minor: 0,
            store: None,
            country: None,
        })
        .collect();

    let rows = state
        .analytics_repository
        .insert_facts(&facts)
        .await
        .map_err(|e| {
            error!("Failed to persist analytics rows: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(rows)))
}

/// Manually save a fact row
pub async fn save_fact(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<SaveFactRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.song_title.trim().is_empty() {
        return Err(ApiError::Validation("song_title is required".to_string()));
    }

    let fact = NewStreamFact {
        email: auth.email.clone(),
        artist_id: payload.artist_id,
        song_title: payload.song_title,
        streams: payload.streams,
        stream_time_secs: payload.stream_time_secs,
        revenue_minor: payload.revenue_minor,
        store: payload.store,
        country: payload.country,
    };

    let row = state
        .analytics_repository
        .insert_fact(&fact)
        .await
        .map_err(|e| {
            error!("Failed to persist analytics row: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(row)))
}

/// Summed totals for the caller (and optionally one artist)
pub async fn totals(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(scope): Query<AnalyticsScope>,
) -> ApiResult<impl IntoResponse> {
    let totals = state
        .analytics_repository
        .totals(&auth.email, scope.artist_id.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to aggregate totals: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Analytics data"))?;

    Ok(Json(totals))
}

/// Streams bucketed by calendar month
pub async fn streams_per_month(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(scope): Query<AnalyticsScope>,
) -> ApiResult<impl IntoResponse> {
    let buckets = state
        .analytics_repository
        .streams_per_month(&auth.email, scope.artist_id.as_deref())
        .await
        .map_err(|e| {
            error!("Failed to aggregate monthly streams: {}", e);
            ApiError::InternalServerError
        })?;

    if buckets.is_empty() {
        return Err(ApiError::NotFound("Analytics data"));
    }

    Ok(Json(buckets))
}

/// The caller's raw fact rows, newest first
pub async fn list_facts(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let rows = state
        .analytics_repository
        .list_facts(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to list analytics rows: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(rows))
}

/// Artist search passthrough to the streaming platform
pub async fn search_artists(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    if query.q.trim().is_empty() {
        return Err(ApiError::Validation("q is required".to_string()));
    }

    let body = state.streaming.search_artists(&query.q).await?;

    Ok(Json(body))
}

//! Payout, transfer, and approval routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    gateway,
    middleware::AuthUser,
    models::payout::{
        ApproveTransactionRequest, InitiatePayoutRequest, InitiateTransferRequest,
        UpsertDestinationRequest,
    },
    money::Currency,
    state::AppState,
};

/// Bank-account resolution payload.
#[derive(Deserialize)]
pub struct ResolveAccountRequest {
    pub account_number: String,
    pub account_bank: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/payouts/destination", post(upsert_destination))
        .route("/api/payouts/destinations", get(list_destinations))
        .route("/api/payouts/transfer", post(initiate_transfer))
        .route("/api/payouts/resolve-account", post(resolve_account))
        .route("/api/payouts/transfers/:reference/verify", get(verify_transfer))
        .route("/api/payouts/transactions", get(list_transactions))
        .route("/api/payouts/initiate", post(initiate_payout))
        .route("/api/payouts/:id/approve", post(approve_transaction))
        .route("/api/payouts/:id/approvals", get(list_approvals))
}

/// Save the caller's payout destination for one currency.
///
/// The destination must already carry every field its currency requires, so
/// approval-time dispatch never discovers an incomplete destination.
pub async fn upsert_destination(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpsertDestinationRequest>,
) -> ApiResult<impl IntoResponse> {
    let currency = Currency::from_code(&payload.currency)
        .ok_or_else(|| ApiError::UnsupportedCurrency(payload.currency.clone()))?;
    gateway::validate_fields(currency, &payload.fields).map_err(ApiError::MissingField)?;

    let destination = state
        .payout_repository
        .upsert_destination(&auth.email, currency, &payload.fields)
        .await
        .map_err(|e| {
            error!("Failed to upsert payout destination: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(destination))
}

/// All payout destinations the caller has configured.
pub async fn list_destinations(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let destinations = state
        .payout_repository
        .list_destinations(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to list payout destinations: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(destinations))
}

/// Immediate transfer out of the caller's wallet.
pub async fn initiate_transfer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<InitiateTransferRequest>,
) -> ApiResult<impl IntoResponse> {
    let response = state
        .payout_service
        .initiate_transfer(&auth.email, &payload)
        .await?;

    Ok(Json(response))
}

/// Read-only passthrough to the gateway's account-name resolution.
pub async fn resolve_account(
    State(state): State<AppState>,
    Json(payload): Json<ResolveAccountRequest>,
) -> ApiResult<impl IntoResponse> {
    let body = state
        .gateway
        .resolve_account(&payload.account_number, &payload.account_bank)
        .await?;

    Ok(Json(body))
}

/// Read-only passthrough to the gateway's transfer verification.
pub async fn verify_transfer(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let body = state.gateway.verify_transfer(&reference).await?;

    Ok(Json(body))
}

/// The caller's ledger, newest first.
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let transactions = state
        .payout_repository
        .list_transactions(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to list transactions: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(transactions))
}

/// Open a Pending payout awaiting admin approval.
pub async fn initiate_payout(
    State(state): State<AppState>,
    Json(payload): Json<InitiatePayoutRequest>,
) -> ApiResult<impl IntoResponse> {
    let transaction = state.payout_service.initiate_payout(&payload).await?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Decide a Pending (or Failed) payout.
pub async fn approve_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApproveTransactionRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.payout_service.approve(id, &payload).await?;

    Ok(Json(outcome))
}

/// Decisions recorded against one payout.
pub async fn list_approvals(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let approvals = state
        .payout_repository
        .list_approvals(id)
        .await
        .map_err(|e| {
            error!("Failed to list approvals: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(approvals))
}

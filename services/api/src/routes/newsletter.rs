//! Newsletter and contact-form routes
//!
//! The `/api/newsLetter` casing is what shipped clients already call.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use tracing::error;

use crate::{
    error::{ApiError, ApiResult},
    models::newsletter::{ContactRequest, SendNewsletterRequest, SubscribeRequest},
    state::AppState,
    validation::validate_email,
};

/// Routes that do not require a verified identity.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/newsLetter/subscribe", post(subscribe))
        .route("/api/newsLetter/unsubscribe", post(unsubscribe))
        .route("/api/newsLetter/contact", post(contact))
}

/// Routes behind the auth middleware.
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/api/newsLetter/send", post(send_newsletter))
}

/// Subscribe an email to the newsletter
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;

    let subscriber = state
        .newsletter_repository
        .subscribe(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to subscribe: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(subscriber)))
}

/// Remove a subscription
pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(payload): Json<SubscribeRequest>,
) -> ApiResult<impl IntoResponse> {
    let removed = state
        .newsletter_repository
        .unsubscribe(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to unsubscribe: {}", e);
            ApiError::InternalServerError
        })?;

    if removed {
        Ok(Json(serde_json::json!({"message": "Unsubscribed"})))
    } else {
        Err(ApiError::NotFound("Subscriber"))
    }
}

/// Broadcast a newsletter issue to every subscriber.
///
/// Per-recipient failures are counted rather than aborting the broadcast.
pub async fn send_newsletter(
    State(state): State<AppState>,
    Json(payload): Json<SendNewsletterRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.subject.trim().is_empty() || payload.body_html.trim().is_empty() {
        return Err(ApiError::Validation(
            "subject and body_html are required".to_string(),
        ));
    }

    let subscribers = state
        .newsletter_repository
        .list_subscribers()
        .await
        .map_err(|e| {
            error!("Failed to list subscribers: {}", e);
            ApiError::InternalServerError
        })?;

    let mut sent = 0usize;
    let mut failed = 0usize;
    for subscriber in &subscribers {
        match state
            .mailer
            .send_newsletter(&subscriber.email, &payload.subject, &payload.body_html)
            .await
        {
            Ok(()) => sent += 1,
            Err(e) => {
                error!("Newsletter send to {} failed: {}", subscriber.email, e);
                failed += 1;
            }
        }
    }

    Ok(Json(serde_json::json!({
        "sent": sent,
        "failed": failed,
    })))
}

/// Relay a contact-form message to the support inbox
pub async fn contact(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    if payload.message.trim().is_empty() {
        return Err(ApiError::Validation("message is required".to_string()));
    }

    state
        .mailer
        .send_contact(&payload.name, &payload.email, &payload.message)
        .await
        .map_err(|e| {
            error!("Contact relay failed: {}", e);
            ApiError::Upstream {
                status: 502,
                body: "mail relay unavailable".to_string(),
            }
        })?;

    Ok(Json(serde_json::json!({"message": "Message sent"})))
}

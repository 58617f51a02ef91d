//! Authentication and account routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::user::{LoginRequest, SignupRequest, UpdateProfileRequest, UserResponse},
    state::AppState,
    validation::{validate_email, validate_password},
};

/// OTP lifetime.
const OTP_TTL_MINUTES: i64 = 10;

/// Response carrying a fresh token pair.
#[derive(Serialize)]
pub struct TokenResponse {
    pub user: UserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request for token refresh
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// OTP request payload
#[derive(Deserialize)]
pub struct OtpRequest {
    pub email: String,
}

/// OTP verification payload
#[derive(Deserialize)]
pub struct OtpVerifyRequest {
    pub email: String,
    pub code: String,
}

/// OTP-gated password reset payload
#[derive(Deserialize)]
pub struct PasswordResetRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

/// Routes that do not require a verified identity.
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/auth/refresh", post(refresh_token))
        .route("/api/auth/otp/request", post(request_otp))
        .route("/api/auth/otp/verify", post(verify_otp))
        .route("/api/auth/password/reset", post(reset_password))
}

/// Routes behind the auth middleware.
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/profile", get(get_profile))
        .route("/api/auth/profile", put(update_profile))
}

fn token_pair(state: &AppState, user: &crate::models::user::User) -> ApiResult<TokenResponse> {
    let access_token = state.jwt_service.generate_access_token(user).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        ApiError::InternalServerError
    })?;
    let refresh_token = state.jwt_service.generate_refresh_token(user).map_err(|e| {
        error!("Failed to generate refresh token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(TokenResponse {
        user: user.clone().into(),
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    })
}

/// Sign up a new artist or label account
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_email(&payload.email).map_err(ApiError::Validation)?;
    validate_password(&payload.password).map_err(ApiError::Validation)?;
    if payload.full_name.trim().is_empty() {
        return Err(ApiError::Validation("full_name is required".to_string()));
    }

    let existing = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let user = state.user_repository.create(&payload).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        ApiError::InternalServerError
    })?;

    state.mailer.send_welcome(&user.email, &user.full_name).await;

    let response = token_pair(&state, &user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Log in with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    info!("Login attempt for {}", payload.email);

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::Unauthorized)?;

    let valid = state
        .user_repository
        .verify_password(&user, &payload.password)
        .map_err(|e| {
            error!("Failed to verify password: {}", e);
            ApiError::InternalServerError
        })?;
    if !valid {
        return Err(ApiError::Unauthorized);
    }

    state.mailer.send_login_notice(&user.email).await;

    let response = token_pair(&state, &user)?;
    Ok(Json(response))
}

/// Exchange a refresh token for a new access token
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> ApiResult<impl IntoResponse> {
    let claims = state
        .jwt_service
        .validate_refresh_token(&payload.refresh_token)
        .map_err(|_| ApiError::InvalidToken)?;

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User"))?;

    let access_token = state.jwt_service.generate_access_token(&user).map_err(|e| {
        error!("Failed to generate access token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(RefreshTokenResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    }))
}

/// Generate a 6-digit OTP.
fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000u32))
}

/// True when the stored OTP matches and has not expired.
fn otp_is_valid(
    stored_code: Option<&str>,
    expires_at: Option<DateTime<Utc>>,
    submitted: &str,
    now: DateTime<Utc>,
) -> bool {
    match (stored_code, expires_at) {
        (Some(code), Some(expiry)) => code == submitted && now < expiry,
        _ => false,
    }
}

/// Email a one-time code to the account holder
pub async fn request_otp(
    State(state): State<AppState>,
    Json(payload): Json<OtpRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User"))?;

    let code = generate_otp();
    let expires_at = Utc::now() + Duration::minutes(OTP_TTL_MINUTES);

    state
        .user_repository
        .set_otp(&payload.email, &code, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to store OTP: {}", e);
            ApiError::InternalServerError
        })?;

    state
        .mailer
        .send_otp(&payload.email, &code)
        .await
        .map_err(|e| {
            error!("Failed to send OTP mail: {}", e);
            ApiError::Upstream {
                status: 502,
                body: "mail relay unavailable".to_string(),
            }
        })?;

    Ok(Json(serde_json::json!({"message": "OTP sent"})))
}

/// Verify a one-time code, marking the account KYC-verified
pub async fn verify_otp(
    State(state): State<AppState>,
    Json(payload): Json<OtpVerifyRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User"))?;

    if !otp_is_valid(
        user.otp_code.as_deref(),
        user.otp_expires_at,
        &payload.code,
        Utc::now(),
    ) {
        return Err(ApiError::Validation("Invalid or expired code".to_string()));
    }

    state
        .user_repository
        .mark_kyc_verified(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to mark user verified: {}", e);
            ApiError::InternalServerError
        })?;
    state
        .user_repository
        .clear_otp(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to clear OTP: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(serde_json::json!({"message": "Account verified"})))
}

/// OTP-gated password reset
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<PasswordResetRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_password(&payload.new_password).map_err(ApiError::Validation)?;

    let user = state
        .user_repository
        .find_by_email(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to look up user: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User"))?;

    if !otp_is_valid(
        user.otp_code.as_deref(),
        user.otp_expires_at,
        &payload.code,
        Utc::now(),
    ) {
        return Err(ApiError::Validation("Invalid or expired code".to_string()));
    }

    state
        .user_repository
        .set_password(&payload.email, &payload.new_password)
        .await
        .map_err(|e| {
            error!("Failed to reset password: {}", e);
            ApiError::InternalServerError
        })?;
    state
        .user_repository
        .clear_otp(&payload.email)
        .await
        .map_err(|e| {
            error!("Failed to clear OTP: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(serde_json::json!({"message": "Password updated"})))
}

/// Current user's profile
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_id(auth.id)
        .await
        .map_err(|e| {
            error!("Failed to load profile: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the current user's profile
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .update_profile(&auth.email, &payload)
        .await
        .map_err(|e| {
            error!("Failed to update profile: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_otp_is_six_digits() {
        for _ in 0..100 {
            let code = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_otp_is_valid() {
        let now = Utc::now();
        let soon = now + Duration::minutes(5);
        let past = now - Duration::minutes(1);

        assert!(otp_is_valid(Some("123456"), Some(soon), "123456", now));
        assert!(!otp_is_valid(Some("123456"), Some(soon), "654321", now));
        assert!(!otp_is_valid(Some("123456"), Some(past), "123456", now));
        assert!(!otp_is_valid(None, None, "123456", now));
        assert!(!otp_is_valid(Some("123456"), None, "123456", now));
    }
}

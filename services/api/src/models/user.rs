//! User model and related payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Account type chosen at sign-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "team_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TeamType {
    Artist,
    RecordLabel,
}

/// User entity
///
/// `balance_minor` is the wallet balance in integer minor units of the
/// user's payout currency family; it is only ever mutated through the
/// conditional debit/credit queries in the user repository.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub team_type: TeamType,
    pub country: String,
    pub gender: Option<String>,
    pub balance_minor: i64,
    pub kyc_verified: bool,
    #[serde(skip_serializing)]
    pub otp_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sign-up payload
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub team_type: TeamType,
    pub country: String,
    pub gender: Option<String>,
}

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update payload; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
}

/// Public view of a user, returned by auth and profile endpoints.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub team_type: TeamType,
    pub country: String,
    pub gender: Option<String>,
    pub balance_minor: i64,
    pub kyc_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            team_type: user.team_type,
            country: user.country,
            gender: user.gender,
            balance_minor: user.balance_minor,
            kyc_verified: user.kyc_verified,
            created_at: user.created_at,
        }
    }
}

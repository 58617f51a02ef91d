//! User repository for database operations
//!
//! Balance mutations go through `debit_if_sufficient` and `credit` only.
//! The debit is a single conditional UPDATE so that two concurrent payouts
//! cannot both pass a balance check before either commits.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{SignupRequest, UpdateProfileRequest, User};
use crate::money::Money;

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();
        Ok(hash)
    }

    /// Create a new user with a hashed password and zero balance
    pub async fn create(&self, signup: &SignupRequest) -> Result<User> {
        info!("Creating new user: {}", signup.email);

        let password_hash = Self::hash_password(&signup.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name, team_type, country, gender)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&signup.email)
        .bind(&password_hash)
        .bind(&signup.full_name)
        .bind(signup.team_type)
        .bind(&signup.country)
        .bind(&signup.gender)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by email
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Verify a user's password
    pub fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Update profile fields; absent fields are left untouched
    pub async fn update_profile(
        &self,
        email: &str,
        update: &UpdateProfileRequest,
    ) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET full_name = COALESCE($2, full_name),
                country = COALESCE($3, country),
                gender = COALESCE($4, gender),
                updated_at = now()
            WHERE email = $1
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(&update.full_name)
        .bind(&update.country)
        .bind(&update.gender)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace the user's password hash
    pub async fn set_password(&self, email: &str, new_password: &str) -> Result<bool> {
        let password_hash = Self::hash_password(new_password)?;

        let result =
            sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE email = $1")
                .bind(email)
                .bind(&password_hash)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Store an OTP code with its expiry
    pub async fn set_otp(
        &self,
        email: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE users SET otp_code = $2, otp_expires_at = $3, updated_at = now() WHERE email = $1",
        )
        .bind(email)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear any stored OTP
    pub async fn clear_otp(&self, email: &str) -> Result<()> {
        sqlx::query(
            "UPDATE users SET otp_code = NULL, otp_expires_at = NULL, updated_at = now() WHERE email = $1",
        )
        .bind(email)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Mark the user as KYC verified
    pub async fn mark_kyc_verified(&self, email: &str) -> Result<()> {
        sqlx::query("UPDATE users SET kyc_verified = TRUE, updated_at = now() WHERE email = $1")
            .bind(email)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Debit the balance only if it covers the amount.
    ///
    /// Returns the new balance in minor units, or `None` when the stored
    /// balance was insufficient (in which case nothing changed).
    pub async fn debit_if_sufficient(&self, id: Uuid, amount: Money) -> Result<Option<i64>> {
        info!("Attempting debit of {} minor units for user {}", amount.minor(), id);

        let new_balance: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance_minor = balance_minor - $2, updated_at = now()
            WHERE id = $1 AND balance_minor >= $2
            RETURNING balance_minor
            "#,
        )
        .bind(id)
        .bind(amount.minor())
        .fetch_optional(&self.pool)
        .await?;

        Ok(new_balance)
    }

    /// Credit the balance, returning the new balance in minor units.
    pub async fn credit(&self, id: Uuid, amount: Money) -> Result<i64> {
        info!("Crediting {} minor units to user {}", amount.minor(), id);

        let new_balance: i64 = sqlx::query_scalar(
            r#"
            UPDATE users
            SET balance_minor = balance_minor + $2, updated_at = now()
            WHERE id = $1
            RETURNING balance_minor
            "#,
        )
        .bind(id)
        .bind(amount.minor())
        .fetch_one(&self.pool)
        .await?;

        Ok(new_balance)
    }
}

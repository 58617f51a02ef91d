//! Payout repository: transactions, destinations, approvals
//!
//! Status changes on transactions go through `transition_status`, which only
//! succeeds from an allowed prior state. Approvals are insert-once rows.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::payout::{
    PayoutDestination, Transaction, TransactionApproval, TransactionDirection, TransactionStatus,
    TransferFields,
};
use crate::money::{Currency, Money};

/// Payout repository
#[derive(Clone)]
pub struct PayoutRepository {
    pool: PgPool,
}

impl PayoutRepository {
    /// Create a new payout repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert or replace the destination for (email, currency).
    pub async fn upsert_destination(
        &self,
        email: &str,
        currency: Currency,
        fields: &TransferFields,
    ) -> Result<PayoutDestination> {
        info!("Upserting payout destination for {} ({})", email, currency);

        let destination = sqlx::query_as::<_, PayoutDestination>(
            r#"
            INSERT INTO payout_destinations (
                email, currency, account_bank, account_number, beneficiary_name,
                destination_branch_code, routing_number, swift_code, bank_name,
                beneficiary_country, beneficiary_address, sender, sender_country,
                mobile_number, first_name, last_name, contact_email
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            ON CONFLICT (email, currency) DO UPDATE SET
                account_bank = EXCLUDED.account_bank,
                account_number = EXCLUDED.account_number,
                beneficiary_name = EXCLUDED.beneficiary_name,
                destination_branch_code = EXCLUDED.destination_branch_code,
                routing_number = EXCLUDED.routing_number,
                swift_code = EXCLUDED.swift_code,
                bank_name = EXCLUDED.bank_name,
                beneficiary_country = EXCLUDED.beneficiary_country,
                beneficiary_address = EXCLUDED.beneficiary_address,
                sender = EXCLUDED.sender,
                sender_country = EXCLUDED.sender_country,
                mobile_number = EXCLUDED.mobile_number,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                contact_email = EXCLUDED.contact_email,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(currency.code())
        .bind(&fields.account_bank)
        .bind(&fields.account_number)
        .bind(&fields.beneficiary_name)
        .bind(&fields.destination_branch_code)
        .bind(&fields.routing_number)
        .bind(&fields.swift_code)
        .bind(&fields.bank_name)
        .bind(&fields.beneficiary_country)
        .bind(&fields.beneficiary_address)
        .bind(&fields.sender)
        .bind(&fields.sender_country)
        .bind(&fields.mobile_number)
        .bind(&fields.first_name)
        .bind(&fields.last_name)
        .bind(&fields.email)
        .fetch_one(&self.pool)
        .await?;

        Ok(destination)
    }

    /// Find the destination for (email, currency); at most one exists.
    pub async fn find_destination(
        &self,
        email: &str,
        currency: Currency,
    ) -> Result<Option<PayoutDestination>> {
        let destination = sqlx::query_as::<_, PayoutDestination>(
            "SELECT * FROM payout_destinations WHERE email = $1 AND currency = $2",
        )
        .bind(email)
        .bind(currency.code())
        .fetch_optional(&self.pool)
        .await?;

        Ok(destination)
    }

    /// All destinations a user has configured.
    pub async fn list_destinations(&self, email: &str) -> Result<Vec<PayoutDestination>> {
        let destinations = sqlx::query_as::<_, PayoutDestination>(
            "SELECT * FROM payout_destinations WHERE email = $1 ORDER BY currency",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(destinations)
    }

    /// Append a ledger row.
    #[allow(clippy::too_many_arguments)]
    pub async fn insert_transaction(
        &self,
        email: &str,
        narration: &str,
        direction: TransactionDirection,
        amount: Money,
        currency: Currency,
        balance_after: i64,
        status: TransactionStatus,
        gateway_reference: Option<&str>,
    ) -> Result<Transaction> {
        info!(
            "Recording {:?} transaction of {} {} for {}",
            direction,
            amount.minor(),
            currency,
            email
        );

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (
                email, narration, direction, amount_minor, currency,
                balance_after_minor, status, gateway_reference
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(narration)
        .bind(direction)
        .bind(amount.minor())
        .bind(currency.code())
        .bind(balance_after)
        .bind(status)
        .bind(gateway_reference)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Find a transaction by ID.
    pub async fn find_transaction(&self, id: Uuid) -> Result<Option<Transaction>> {
        let transaction =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(transaction)
    }

    /// A user's ledger, newest first.
    pub async fn list_transactions(&self, email: &str) -> Result<Vec<Transaction>> {
        let transactions = sqlx::query_as::<_, Transaction>(
            "SELECT * FROM transactions WHERE email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(transactions)
    }

    /// Move a transaction to `to`, but only from one of `allowed_from`.
    ///
    /// Returns the updated row, or `None` when the transaction was not in an
    /// allowed state (already decided, or decided by a concurrent request).
    pub async fn transition_status(
        &self,
        id: Uuid,
        to: TransactionStatus,
        allowed_from: &[TransactionStatus],
    ) -> Result<Option<Transaction>> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            UPDATE transactions
            SET status = $2
            WHERE id = $1 AND status = ANY($3)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(to)
        .bind(allowed_from.to_vec())
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Record an approval decision.
    pub async fn insert_approval(
        &self,
        transaction_id: Uuid,
        approved: bool,
        admin_comments: Option<&str>,
    ) -> Result<TransactionApproval> {
        let approval = sqlx::query_as::<_, TransactionApproval>(
            r#"
            INSERT INTO transaction_approvals (transaction_id, approved, admin_comments)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(transaction_id)
        .bind(approved)
        .bind(admin_comments)
        .fetch_one(&self.pool)
        .await?;

        Ok(approval)
    }

    /// Approvals recorded against a transaction, oldest first.
    pub async fn list_approvals(&self, transaction_id: Uuid) -> Result<Vec<TransactionApproval>> {
        let approvals = sqlx::query_as::<_, TransactionApproval>(
            "SELECT * FROM transaction_approvals WHERE transaction_id = $1 ORDER BY created_at",
        )
        .bind(transaction_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(approvals)
    }
}

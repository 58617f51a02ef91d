//! Wallet ledger, payout destination, and approval models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Lifecycle of a ledger transaction.
///
/// `Pending` transactions are created by the approval flow and move to
/// `Completed` or `Rejected` when an admin decides. `Failed` marks a gateway
/// failure during approval and is retryable; `Completed` and `Rejected` are
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
    Failed,
}

/// Direction of a balance-affecting event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "transaction_direction", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionDirection {
    Credit,
    Debit,
}

/// Append-only ledger row; only `status` ever changes after insert, and only
/// through the guarded transitions in the payout repository.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub email: String,
    pub narration: String,
    pub direction: TransactionDirection,
    pub amount_minor: i64,
    pub currency: String,
    /// User balance immediately after this event, in minor units.
    pub balance_after_minor: i64,
    pub status: TransactionStatus,
    pub gateway_reference: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user's payout receiving details for one currency.
///
/// One row per (email, currency) pair, enforced by a unique index, so a
/// transfer always resolves to exactly one destination.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PayoutDestination {
    pub id: Uuid,
    pub email: String,
    pub currency: String,
    pub account_bank: Option<String>,
    pub account_number: Option<String>,
    pub beneficiary_name: Option<String>,
    pub destination_branch_code: Option<String>,
    pub routing_number: Option<String>,
    pub swift_code: Option<String>,
    pub bank_name: Option<String>,
    pub beneficiary_country: Option<String>,
    pub beneficiary_address: Option<String>,
    pub sender: Option<String>,
    pub sender_country: Option<String>,
    pub mobile_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub contact_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PayoutDestination {
    /// View the stored destination as transfer fields for payload shaping.
    pub fn to_transfer_fields(&self) -> TransferFields {
        TransferFields {
            account_bank: self.account_bank.clone(),
            account_number: self.account_number.clone(),
            beneficiary_name: self.beneficiary_name.clone(),
            destination_branch_code: self.destination_branch_code.clone(),
            routing_number: self.routing_number.clone(),
            swift_code: self.swift_code.clone(),
            bank_name: self.bank_name.clone(),
            beneficiary_country: self.beneficiary_country.clone(),
            beneficiary_address: self.beneficiary_address.clone(),
            sender: self.sender.clone(),
            sender_country: self.sender_country.clone(),
            mobile_number: self.mobile_number.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email: self.contact_email.clone(),
        }
    }
}

/// Admin decision on a pending transaction. Insert-once per decision.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionApproval {
    pub id: Uuid,
    pub transaction_id: Uuid,
    pub approved: bool,
    pub admin_comments: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Beneficiary fields accepted by the transfer endpoints.
///
/// Which of these are required depends on the currency; the gateway module
/// owns that table. Empty strings count as absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferFields {
    pub account_bank: Option<String>,
    pub account_number: Option<String>,
    pub beneficiary_name: Option<String>,
    pub destination_branch_code: Option<String>,
    pub routing_number: Option<String>,
    pub swift_code: Option<String>,
    pub bank_name: Option<String>,
    pub beneficiary_country: Option<String>,
    pub beneficiary_address: Option<String>,
    pub sender: Option<String>,
    pub sender_country: Option<String>,
    pub mobile_number: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl TransferFields {
    /// Look up a field by its wire name, treating empty strings as absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        let value = match name {
            "account_bank" => &self.account_bank,
            "account_number" => &self.account_number,
            "beneficiary_name" => &self.beneficiary_name,
            "destination_branch_code" => &self.destination_branch_code,
            "routing_number" => &self.routing_number,
            "swift_code" => &self.swift_code,
            "bank_name" => &self.bank_name,
            "beneficiary_country" => &self.beneficiary_country,
            "beneficiary_address" => &self.beneficiary_address,
            "sender" => &self.sender,
            "sender_country" => &self.sender_country,
            "mobile_number" => &self.mobile_number,
            "first_name" => &self.first_name,
            "last_name" => &self.last_name,
            "email" => &self.email,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

/// Request to initiate an immediate transfer.
#[derive(Debug, Deserialize)]
pub struct InitiateTransferRequest {
    pub currency: String,
    pub amount_minor: i64,
    pub narration: String,
    #[serde(flatten)]
    pub fields: TransferFields,
}

/// Request to open a pending (approval-gated) payout.
#[derive(Debug, Deserialize)]
pub struct InitiatePayoutRequest {
    pub email: String,
    pub narration: String,
    pub amount_minor: i64,
    pub currency: String,
}

/// Admin decision payload.
#[derive(Debug, Deserialize)]
pub struct ApproveTransactionRequest {
    pub approved: bool,
    pub admin_comments: Option<String>,
}

/// Upsert payload for a payout destination.
#[derive(Debug, Deserialize)]
pub struct UpsertDestinationRequest {
    pub currency: String,
    #[serde(flatten)]
    pub fields: TransferFields,
}

/// Response for a transfer that reached the gateway.
#[derive(Debug, Serialize)]
pub struct TransferResponse {
    pub gateway: serde_json::Value,
    pub transaction: Transaction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_fields_get_treats_empty_as_absent() {
        let fields = TransferFields {
            account_bank: Some("044".to_string()),
            account_number: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(fields.get("account_bank"), Some("044"));
        assert_eq!(fields.get("account_number"), None);
        assert_eq!(fields.get("beneficiary_name"), None);
        assert_eq!(fields.get("no_such_field"), None);
    }
}

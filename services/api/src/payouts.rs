//! Payout orchestration
//!
//! Two paths move money out of a wallet:
//!
//! * the direct transfer (`initiate_transfer`), which debits and dispatches
//!   to the gateway in one request, and
//! * the approval flow (`initiate_payout` + `approve`), where a Pending
//!   transaction waits for an admin decision before any money moves.
//!
//! The debit itself is a conditional UPDATE (`balance >= amount`), so a
//! concurrent request can never overdraw; when the gateway declines after a
//! debit, the same amount is credited back before the error is returned.

use tracing::{error, info};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::gateway::{self, GatewayClient, GatewayError};
use crate::models::payout::{
    ApproveTransactionRequest, InitiatePayoutRequest, InitiateTransferRequest, Transaction,
    TransactionApproval, TransactionDirection, TransactionStatus, TransferResponse,
};
use crate::money::{Currency, Money};
use crate::repositories::{PayoutRepository, UserRepository};
use crate::validation::validate_required;

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Declined { status, body } => ApiError::Upstream { status, body },
            GatewayError::Transport(e) => {
                error!("Gateway transport failure: {}", e);
                ApiError::Upstream {
                    status: 502,
                    body: "transfer gateway unreachable".to_string(),
                }
            }
        }
    }
}

/// States an admin decision may act on: freshly initiated payouts and
/// gateway-failed ones being retried. Completed and Rejected are terminal.
const DECIDABLE: &[TransactionStatus] =
    &[TransactionStatus::Pending, TransactionStatus::Failed];

fn is_decidable(status: TransactionStatus) -> bool {
    DECIDABLE.contains(&status)
}

/// Outcome of an approval decision.
#[derive(Debug, serde::Serialize)]
pub struct ApprovalOutcome {
    pub transaction: Transaction,
    pub approval: TransactionApproval,
    pub gateway: Option<serde_json::Value>,
}

/// Payout orchestrator over the user and payout repositories plus the
/// gateway client.
#[derive(Clone)]
pub struct PayoutService {
    users: UserRepository,
    payouts: PayoutRepository,
    gateway: GatewayClient,
}

impl PayoutService {
    pub fn new(users: UserRepository, payouts: PayoutRepository, gateway: GatewayClient) -> Self {
        Self {
            users,
            payouts,
            gateway,
        }
    }

    fn parse_currency(code: &str) -> ApiResult<Currency> {
        Currency::from_code(code).ok_or_else(|| ApiError::UnsupportedCurrency(code.to_string()))
    }

    fn parse_amount(amount_minor: i64) -> ApiResult<Money> {
        let amount = Money::from_minor(amount_minor);
        if !amount.is_positive() {
            return Err(ApiError::Validation(
                "amount_minor must be positive".to_string(),
            ));
        }
        Ok(amount)
    }

    /// Validate, debit, and dispatch an immediate transfer.
    pub async fn initiate_transfer(
        &self,
        email: &str,
        request: &InitiateTransferRequest,
    ) -> ApiResult<TransferResponse> {
        // Everything below the debit is preceded by pure validation, so an
        // unsupported currency or missing field never touches the store.
        let currency = Self::parse_currency(&request.currency)?;
        let amount = Self::parse_amount(request.amount_minor)?;
        validate_required(&request.narration, "narration").map_err(ApiError::Validation)?;
        gateway::validate_fields(currency, &request.fields).map_err(ApiError::MissingField)?;

        let user = self
            .users
            .find_by_email(email)
            .await
            .map_err(internal)?
            .ok_or(ApiError::NotFound("User"))?;

        let new_balance = self
            .users
            .debit_if_sufficient(user.id, amount)
            .await
            .map_err(internal)?
            .ok_or(ApiError::InsufficientBalance)?;

        let reference = format!("wh-{}", Uuid::new_v4());
        let payload = gateway::build_transfer_payload(
            currency,
            amount,
            &request.narration,
            &reference,
            &request.fields,
        );

        let gateway_body = match self.gateway.initiate_transfer(&payload).await {
            Ok(body) => body,
            Err(e) => {
                // The debit already landed; put the money back before
                // surfacing the gateway's response.
                self.users
                    .credit(user.id, amount)
                    .await
                    .map_err(internal)?;
                return Err(e.into());
            }
        };

        let transaction = self
            .payouts
            .insert_transaction(
                email,
                &request.narration,
                TransactionDirection::Debit,
                amount,
                currency,
                new_balance,
                TransactionStatus::Completed,
                Some(&reference),
            )
            .await
            .map_err(internal)?;

        info!(
            "Transfer {} completed for {}: {} {} debited",
            reference,
            email,
            amount.minor(),
            currency
        );

        Ok(TransferResponse {
            gateway: gateway_body,
            transaction,
        })
    }

    /// Open a Pending transaction awaiting admin approval.
    ///
    /// No money moves here; `balance_after_minor` is the snapshot the ledger
    /// will show once the debit executes at approval time.
    pub async fn initiate_payout(
        &self,
        request: &InitiatePayoutRequest,
    ) -> ApiResult<Transaction> {
        validate_required(&request.email, "email").map_err(ApiError::Validation)?;
        validate_required(&request.narration, "narration").map_err(ApiError::Validation)?;
        let currency = Self::parse_currency(&request.currency)?;
        let amount = Self::parse_amount(request.amount_minor)?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await
            .map_err(internal)?
            .ok_or(ApiError::NotFound("User"))?;

        self.payouts
            .find_destination(&request.email, currency)
            .await
            .map_err(internal)?
            .ok_or(ApiError::NotFound("Payout destination"))?;

        if user.balance_minor < amount.minor() {
            return Err(ApiError::InsufficientBalance);
        }

        let transaction = self
            .payouts
            .insert_transaction(
                &request.email,
                &request.narration,
                TransactionDirection::Debit,
                amount,
                currency,
                user.balance_minor - amount.minor(),
                TransactionStatus::Pending,
                None,
            )
            .await
            .map_err(internal)?;

        Ok(transaction)
    }

    /// Decide a Pending (or retryable Failed) transaction.
    ///
    /// Rejection never calls the gateway. Approval debits, then CLAIMS the
    /// transaction with the guarded transition to Completed, and only the
    /// claim winner dispatches to the gateway; a concurrent approval loses
    /// the claim, gets its debit credited back, and returns 409 without
    /// reaching the gateway. A gateway decline rolls the claim back to
    /// Failed (retryable) and credits the debit back. A transaction that is
    /// already Completed or Rejected returns 409 with no gateway call and
    /// no balance change.
    pub async fn approve(
        &self,
        transaction_id: Uuid,
        request: &ApproveTransactionRequest,
    ) -> ApiResult<ApprovalOutcome> {
        let transaction = self
            .payouts
            .find_transaction(transaction_id)
            .await
            .map_err(internal)?
            .ok_or(ApiError::NotFound("Transaction"))?;

        if !is_decidable(transaction.status) {
            return Err(ApiError::Conflict(format!(
                "Transaction already {:?}",
                transaction.status
            )));
        }

        if !request.approved {
            let transaction = self
                .payouts
                .transition_status(transaction_id, TransactionStatus::Rejected, DECIDABLE)
                .await
                .map_err(internal)?
                .ok_or_else(already_decided)?;

            let approval = self
                .payouts
                .insert_approval(transaction_id, false, request.admin_comments.as_deref())
                .await
                .map_err(internal)?;

            return Ok(ApprovalOutcome {
                transaction,
                approval,
                gateway: None,
            });
        }

        let currency = Self::parse_currency(&transaction.currency)?;
        let amount = Money::from_minor(transaction.amount_minor);

        let user = self
            .users
            .find_by_email(&transaction.email)
            .await
            .map_err(internal)?
            .ok_or(ApiError::NotFound("User"))?;

        let destination = self
            .payouts
            .find_destination(&transaction.email, currency)
            .await
            .map_err(internal)?
            .ok_or(ApiError::NotFound("Payout destination"))?;

        let fields = destination.to_transfer_fields();
        gateway::validate_fields(currency, &fields).map_err(ApiError::MissingField)?;

        self.users
            .debit_if_sufficient(user.id, amount)
            .await
            .map_err(internal)?
            .ok_or(ApiError::InsufficientBalance)?;

        // Claim the transaction BEFORE dispatching. The guarded transition
        // admits exactly one winner, so a concurrent approval that also
        // debited loses here and never reaches the gateway.
        let transaction = match self
            .payouts
            .transition_status(transaction_id, TransactionStatus::Completed, DECIDABLE)
            .await
            .map_err(internal)?
        {
            Some(transaction) => transaction,
            None => {
                self.users
                    .credit(user.id, amount)
                    .await
                    .map_err(internal)?;
                return Err(already_decided());
            }
        };

        let reference = transaction_id.to_string();
        let payload = gateway::build_transfer_payload(
            currency,
            amount,
            &transaction.narration,
            &reference,
            &fields,
        );

        let gateway_body = match self.gateway.initiate_transfer(&payload).await {
            Ok(body) => body,
            Err(e) => {
                // Roll the claim back so the payout can be retried.
                self.users
                    .credit(user.id, amount)
                    .await
                    .map_err(internal)?;
                self.payouts
                    .transition_status(
                        transaction_id,
                        TransactionStatus::Failed,
                        &[TransactionStatus::Completed],
                    )
                    .await
                    .map_err(internal)?;
                return Err(e.into());
            }
        };

        let approval = self
            .payouts
            .insert_approval(transaction_id, true, request.admin_comments.as_deref())
            .await
            .map_err(internal)?;

        info!(
            "Transaction {} approved and completed for {}",
            transaction_id, transaction.email
        );

        Ok(ApprovalOutcome {
            transaction,
            approval,
            gateway: Some(gateway_body),
        })
    }
}

fn internal(err: anyhow::Error) -> ApiError {
    error!("Payout store operation failed: {}", err);
    ApiError::InternalServerError
}

fn already_decided() -> ApiError {
    ApiError::Conflict("Transaction already decided".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_are_not_decidable() {
        assert!(is_decidable(TransactionStatus::Pending));
        assert!(is_decidable(TransactionStatus::Failed));
        assert!(!is_decidable(TransactionStatus::Completed));
        assert!(!is_decidable(TransactionStatus::Rejected));
    }

    #[test]
    fn test_claimed_transaction_cannot_be_claimed_again() {
        // The dispatch claim transitions out of DECIDABLE before any
        // gateway call, so of two concurrent approvals on the same payout
        // only one can ever reach the gateway; the loser's guarded
        // transition finds the claimed state and fails.
        let claimed = TransactionStatus::Completed;
        assert!(!DECIDABLE.contains(&claimed));
        // The decline rollback re-enters the decidable set for retries.
        assert!(DECIDABLE.contains(&TransactionStatus::Failed));
    }
}

//! Transfer gateway client and per-currency payload shaping
//!
//! The gateway's transfer schema differs per currency: some currencies take
//! flat beneficiary fields, the international ones nest most of them under a
//! `meta` object. The tables here are matched exhaustively over [`Currency`],
//! so adding a currency without deciding its field set will not compile.

use reqwest::Client;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tracing::{error, info};

use crate::config::GatewayConfig;
use crate::models::payout::TransferFields;
use crate::money::{Currency, Money};

/// Error from the transfer gateway boundary.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The gateway answered with a non-success status; body attached.
    #[error("gateway returned {status}: {body}")]
    Declined { status: u16, body: String },

    /// The request never completed (connect, TLS, timeout).
    #[error("gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Flat fields the gateway requires at the top level of the payload.
pub fn required_flat_fields(currency: Currency) -> &'static [&'static str] {
    match currency {
        Currency::Ngn => &["account_bank", "account_number"],
        Currency::Ghs | Currency::Tzs | Currency::Ugx | Currency::Kes => {
            &["account_bank", "account_number", "beneficiary_name"]
        }
        Currency::Xof | Currency::Xaf => &[
            "account_number",
            "beneficiary_name",
            "destination_branch_code",
        ],
        Currency::Zar => &["account_bank", "account_number"],
        Currency::Usd | Currency::Eur | Currency::Gbp => &["beneficiary_name"],
    }
}

/// Fields the gateway requires nested under `meta`.
pub fn required_meta_fields(currency: Currency) -> &'static [&'static str] {
    match currency {
        Currency::Ngn
        | Currency::Ghs
        | Currency::Tzs
        | Currency::Ugx
        | Currency::Xof
        | Currency::Xaf => &[],
        Currency::Kes => &["sender", "sender_country", "mobile_number"],
        Currency::Zar => &[
            "first_name",
            "last_name",
            "email",
            "beneficiary_country",
            "mobile_number",
        ],
        Currency::Usd | Currency::Eur | Currency::Gbp => &[
            "account_number",
            "routing_number",
            "swift_code",
            "bank_name",
            "beneficiary_country",
            "beneficiary_address",
            "sender",
            "sender_country",
        ],
    }
}

/// Check that every field the currency requires is present and non-empty.
/// Returns the wire name of the first absent field.
pub fn validate_fields(
    currency: Currency,
    fields: &TransferFields,
) -> Result<(), &'static str> {
    for name in required_flat_fields(currency) {
        if fields.get(name).is_none() {
            return Err(name);
        }
    }
    for name in required_meta_fields(currency) {
        if fields.get(name).is_none() {
            return Err(name);
        }
    }
    Ok(())
}

/// Build the currency-shaped transfer payload.
///
/// Callers must have run [`validate_fields`] first; missing required fields
/// are simply omitted here.
pub fn build_transfer_payload(
    currency: Currency,
    amount: Money,
    narration: &str,
    reference: &str,
    fields: &TransferFields,
) -> Value {
    let mut payload = Map::new();
    payload.insert("currency".to_string(), json!(currency.code()));
    payload.insert(
        "amount".to_string(),
        json!(amount.to_major_string(currency)),
    );
    payload.insert("narration".to_string(), json!(narration));
    payload.insert("reference".to_string(), json!(reference));

    // The francophone corridor settles from a USD wallet.
    if matches!(currency, Currency::Xof | Currency::Xaf) {
        payload.insert("debit_currency".to_string(), json!("USD"));
    }

    for name in required_flat_fields(currency) {
        if let Some(value) = fields.get(name) {
            payload.insert((*name).to_string(), json!(value));
        }
    }

    let meta_names = required_meta_fields(currency);
    if !meta_names.is_empty() {
        let mut meta = Map::new();
        for name in meta_names {
            if let Some(value) = fields.get(name) {
                meta.insert((*name).to_string(), json!(value));
            }
        }
        payload.insert("meta".to_string(), Value::Object(meta));
    }

    Value::Object(payload)
}

/// HTTP client for the transfer gateway.
#[derive(Clone)]
pub struct GatewayClient {
    http: Client,
    base_url: String,
    secret_key: String,
}

impl GatewayClient {
    /// Create a new gateway client. Outbound calls carry a 30 second timeout.
    pub fn new(config: &GatewayConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }

    /// Submit a transfer payload. Returns the gateway's JSON body on
    /// success; any non-2xx response surfaces as [`GatewayError::Declined`]
    /// with the body attached.
    pub async fn initiate_transfer(&self, payload: &Value) -> Result<Value, GatewayError> {
        info!("Submitting transfer to gateway");

        let response = self
            .http
            .post(format!("{}/transfers", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(payload)
            .send()
            .await?;

        self.read_json(response).await
    }

    /// Resolve a bank account number to an account name. Read-only.
    pub async fn resolve_account(
        &self,
        account_number: &str,
        account_bank: &str,
    ) -> Result<Value, GatewayError> {
        let response = self
            .http
            .post(format!("{}/accounts/resolve", self.base_url))
            .bearer_auth(&self.secret_key)
            .json(&json!({
                "account_number": account_number,
                "account_bank": account_bank,
            }))
            .send()
            .await?;

        self.read_json(response).await
    }

    /// Verify the status of a previously submitted transfer. Read-only.
    pub async fn verify_transfer(&self, reference: &str) -> Result<Value, GatewayError> {
        let response = self
            .http
            .get(format!("{}/transfers/{}", self.base_url, reference))
            .bearer_auth(&self.secret_key)
            .send()
            .await?;

        self.read_json(response).await
    }

    async fn read_json(&self, response: reqwest::Response) -> Result<Value, GatewayError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!("Gateway call failed with {}: {}", status, body);
            return Err(GatewayError::Declined {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|_| GatewayError::Declined {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ngn_fields() -> TransferFields {
        TransferFields {
            account_bank: Some("044".to_string()),
            account_number: Some("0690000040".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_every_currency_has_a_field_set() {
        for currency in Currency::ALL {
            let total =
                required_flat_fields(currency).len() + required_meta_fields(currency).len();
            assert!(total > 0, "{} has no required fields", currency);
        }
    }

    #[test]
    fn test_validate_names_first_missing_field() {
        let fields = TransferFields {
            account_number: Some("0690000040".to_string()),
            beneficiary_name: Some("Ada Lovelace".to_string()),
            ..Default::default()
        };
        // XAF requires a branch code; it is the first absent field here.
        assert_eq!(
            validate_fields(Currency::Xaf, &fields),
            Err("destination_branch_code")
        );
    }

    #[test]
    fn test_validate_passes_when_complete() {
        assert_eq!(validate_fields(Currency::Ngn, &ngn_fields()), Ok(()));
    }

    #[test]
    fn test_validate_checks_meta_fields() {
        let fields = TransferFields {
            beneficiary_name: Some("Ada Lovelace".to_string()),
            account_number: Some("12345678".to_string()),
            routing_number: Some("026009593".to_string()),
            swift_code: Some("BOFAUS3N".to_string()),
            bank_name: Some("Bank of America".to_string()),
            beneficiary_country: Some("US".to_string()),
            beneficiary_address: Some("1 Main St".to_string()),
            sender: Some("Wavehouse".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_fields(Currency::Usd, &fields), Err("sender_country"));
    }

    #[test]
    fn test_ngn_payload_is_flat() {
        let payload = build_transfer_payload(
            Currency::Ngn,
            Money::from_minor(20000),
            "March royalties",
            "wh-tx-1",
            &ngn_fields(),
        );

        assert_eq!(payload["currency"], "NGN");
        assert_eq!(payload["amount"], "200.00");
        assert_eq!(payload["account_bank"], "044");
        assert_eq!(payload["account_number"], "0690000040");
        assert!(payload.get("meta").is_none());
        assert!(payload.get("debit_currency").is_none());
    }

    #[test]
    fn test_usd_payload_nests_meta() {
        let fields = TransferFields {
            beneficiary_name: Some("Ada Lovelace".to_string()),
            account_number: Some("12345678".to_string()),
            routing_number: Some("026009593".to_string()),
            swift_code: Some("BOFAUS3N".to_string()),
            bank_name: Some("Bank of America".to_string()),
            beneficiary_country: Some("US".to_string()),
            beneficiary_address: Some("1 Main St".to_string()),
            sender: Some("Wavehouse".to_string()),
            sender_country: Some("NG".to_string()),
            ..Default::default()
        };

        let payload = build_transfer_payload(
            Currency::Usd,
            Money::from_minor(5000),
            "Advance",
            "wh-tx-2",
            &fields,
        );

        assert_eq!(payload["beneficiary_name"], "Ada Lovelace");
        assert_eq!(payload["meta"]["routing_number"], "026009593");
        assert_eq!(payload["meta"]["swift_code"], "BOFAUS3N");
        assert!(payload.get("routing_number").is_none());
    }

    #[test]
    fn test_xaf_payload_sets_debit_currency() {
        let fields = TransferFields {
            account_number: Some("00001234".to_string()),
            beneficiary_name: Some("Ada Lovelace".to_string()),
            destination_branch_code: Some("GH280103".to_string()),
            ..Default::default()
        };

        let payload = build_transfer_payload(
            Currency::Xaf,
            Money::from_minor(1500),
            "Payout",
            "wh-tx-3",
            &fields,
        );

        assert_eq!(payload["debit_currency"], "USD");
        // Zero-decimal currency renders without a fraction.
        assert_eq!(payload["amount"], "1500");
        assert_eq!(payload["destination_branch_code"], "GH280103");
    }
}

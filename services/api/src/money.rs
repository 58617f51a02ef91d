//! Monetary types
//!
//! Balances and amounts are carried as integer minor units end to end.
//! Floating point never touches money; the only place a decimal string is
//! produced is at the gateway boundary, where the payout amount is rendered
//! in major units.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies supported by the transfer gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "NGN")]
    Ngn,
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "GHS")]
    Ghs,
    #[serde(rename = "TZS")]
    Tzs,
    #[serde(rename = "UGX")]
    Ugx,
    #[serde(rename = "XOF")]
    Xof,
    #[serde(rename = "XAF")]
    Xaf,
    #[serde(rename = "ZAR")]
    Zar,
    #[serde(rename = "KES")]
    Kes,
}

impl Currency {
    /// All supported currencies.
    pub const ALL: [Currency; 11] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Ngn,
        Currency::Gbp,
        Currency::Ghs,
        Currency::Tzs,
        Currency::Ugx,
        Currency::Xof,
        Currency::Xaf,
        Currency::Zar,
        Currency::Kes,
    ];

    /// Parse an ISO 4217 code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_uppercase().as_str() {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "NGN" => Some(Currency::Ngn),
            "GBP" => Some(Currency::Gbp),
            "GHS" => Some(Currency::Ghs),
            "TZS" => Some(Currency::Tzs),
            "UGX" => Some(Currency::Ugx),
            "XOF" => Some(Currency::Xof),
            "XAF" => Some(Currency::Xaf),
            "ZAR" => Some(Currency::Zar),
            "KES" => Some(Currency::Kes),
            _ => None,
        }
    }

    /// The ISO 4217 code.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Ngn => "NGN",
            Currency::Gbp => "GBP",
            Currency::Ghs => "GHS",
            Currency::Tzs => "TZS",
            Currency::Ugx => "UGX",
            Currency::Xof => "XOF",
            Currency::Xaf => "XAF",
            Currency::Zar => "ZAR",
            Currency::Kes => "KES",
        }
    }

    /// Number of minor-unit digits per major unit.
    ///
    /// UGX and the CFA francs are zero-decimal currencies.
    pub fn exponent(&self) -> u32 {
        match self {
            Currency::Ugx | Currency::Xof | Currency::Xaf => 0,
            _ => 2,
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// An amount of money in minor units (cents, kobo, and so on).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Wrap a minor-unit amount.
    pub fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// The raw minor-unit value.
    pub fn minor(&self) -> i64 {
        self.0
    }

    /// True for amounts greater than zero.
    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, other: Money) -> Option<Money> {
        self.0.checked_add(other.0).map(Money)
    }

    pub fn checked_sub(self, other: Money) -> Option<Money> {
        self.0.checked_sub(other.0).map(Money)
    }

    /// Render the amount in major units for the gateway payload, using the
    /// currency's minor-unit exponent ("250" minor NGN becomes "2.50").
    pub fn to_major_string(&self, currency: Currency) -> String {
        let exp = currency.exponent();
        if exp == 0 {
            return self.0.to_string();
        }
        let scale = 10_u64.pow(exp);
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        format!(
            "{}{}.{:0width$}",
            sign,
            abs / scale,
            abs % scale,
            width = exp as usize
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_from_code() {
        assert_eq!(Currency::from_code("NGN"), Some(Currency::Ngn));
        assert_eq!(Currency::from_code("ngn"), Some(Currency::Ngn));
        assert_eq!(Currency::from_code("BTC"), None);
        assert_eq!(Currency::from_code(""), None);
    }

    #[test]
    fn test_all_codes_round_trip() {
        for currency in Currency::ALL {
            assert_eq!(Currency::from_code(currency.code()), Some(currency));
        }
    }

    #[test]
    fn test_major_string_two_decimals() {
        let amount = Money::from_minor(20000);
        assert_eq!(amount.to_major_string(Currency::Ngn), "200.00");
        assert_eq!(Money::from_minor(5).to_major_string(Currency::Usd), "0.05");
    }

    #[test]
    fn test_major_string_zero_decimal() {
        assert_eq!(
            Money::from_minor(1500).to_major_string(Currency::Ugx),
            "1500"
        );
        assert_eq!(
            Money::from_minor(1500).to_major_string(Currency::Xaf),
            "1500"
        );
    }

    #[test]
    fn test_major_string_handles_extreme_negatives() {
        assert_eq!(
            Money::from_minor(i64::MIN).to_major_string(Currency::Usd),
            "-92233720368547758.08"
        );
        assert_eq!(Money::from_minor(-250).to_major_string(Currency::Ngn), "-2.50");
    }

    #[test]
    fn test_checked_arithmetic() {
        let balance = Money::from_minor(1000);
        let amount = Money::from_minor(200);
        assert_eq!(balance.checked_sub(amount), Some(Money::from_minor(800)));
        assert_eq!(
            Money::from_minor(i64::MAX).checked_add(Money::from_minor(1)),
            None
        );
    }
}

//! Cart, order, and promo-code models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One cart per email, enforced by a unique index.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Cart {
    pub id: Uuid,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Line item inside a cart. `price_minor` is mutated in place when a promo
/// code is applied; the pre-discount price is only echoed back once in the
/// apply-promo response.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CartItem {
    pub id: Uuid,
    pub cart_id: Uuid,
    pub item_type: String,
    pub name: String,
    pub price_minor: i64,
}

/// Promo code with a percentage discount.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PromoCode {
    pub id: Uuid,
    pub code: String,
    pub discount_percent: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a checked-out cart.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Order {
    pub id: Uuid,
    pub email: String,
    pub total_minor: i64,
    pub item_count: i32,
    pub created_at: DateTime<Utc>,
}

/// Payload to add an item to the caller's cart.
#[derive(Debug, Deserialize)]
pub struct AddCartItemRequest {
    pub item_type: String,
    pub name: String,
    pub price_minor: i64,
}

/// Payload to apply a promo code to one line item.
#[derive(Debug, Deserialize)]
pub struct ApplyPromoRequest {
    pub code: String,
    pub item_id: Uuid,
}

/// Apply-promo response; the original price is returned here and nowhere
/// else afterwards.
#[derive(Debug, Serialize)]
pub struct ApplyPromoResponse {
    pub item: CartItem,
    pub original_price_minor: i64,
    pub discount_percent: i32,
}

/// Payload to create a promo code.
#[derive(Debug, Deserialize)]
pub struct CreatePromoCodeRequest {
    pub code: String,
    pub discount_percent: i32,
}

/// Apply a percentage discount to a minor-unit price, rounding down.
///
/// The intermediate product is computed in i128 so no accepted price can
/// overflow; the result always fits back in i64 because the discount never
/// exceeds the price.
pub fn discounted_price(price_minor: i64, discount_percent: i32) -> i64 {
    let discount_percent = i128::from(discount_percent.clamp(0, 100));
    let discount = (i128::from(price_minor) * discount_percent) / 100;
    price_minor - discount as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_price() {
        assert_eq!(discounted_price(1000, 10), 900);
        assert_eq!(discounted_price(999, 10), 900);
        assert_eq!(discounted_price(1000, 0), 1000);
        assert_eq!(discounted_price(1000, 100), 0);
    }

    #[test]
    fn test_discount_percent_clamped() {
        assert_eq!(discounted_price(1000, 150), 0);
        assert_eq!(discounted_price(1000, -5), 1000);
    }

    #[test]
    fn test_extreme_price_does_not_overflow() {
        assert_eq!(discounted_price(i64::MAX, 100), 0);
        assert_eq!(discounted_price(i64::MAX, 0), i64::MAX);
        // 50% of i64::MAX rounds down by one minor unit
        assert_eq!(discounted_price(i64::MAX, 50), i64::MAX / 2 + 1);
    }
}

//! Cart, order, and promo-code repository

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::cart::{AddCartItemRequest, Cart, CartItem, Order, PromoCode};

/// Cart repository
#[derive(Clone)]
pub struct CartRepository {
    pool: PgPool,
}

impl CartRepository {
    /// Create a new cart repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the caller's cart, creating it on first use.
    pub async fn get_or_create_cart(&self, email: &str) -> Result<Cart> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"
            INSERT INTO carts (email)
            VALUES ($1)
            ON CONFLICT (email) DO UPDATE SET updated_at = now()
            RETURNING *
            "#,
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(cart)
    }

    /// Items currently in a cart.
    pub async fn list_items(&self, cart_id: Uuid) -> Result<Vec<CartItem>> {
        let items =
            sqlx::query_as::<_, CartItem>("SELECT * FROM cart_items WHERE cart_id = $1 ORDER BY id")
                .bind(cart_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(items)
    }

    /// Add an item to a cart.
    pub async fn add_item(&self, cart_id: Uuid, item: &AddCartItemRequest) -> Result<CartItem> {
        let item = sqlx::query_as::<_, CartItem>(
            r#"
            INSERT INTO cart_items (cart_id, item_type, name, price_minor)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(cart_id)
        .bind(&item.item_type)
        .bind(&item.name)
        .bind(item.price_minor)
        .fetch_one(&self.pool)
        .await?;

        Ok(item)
    }

    /// Find one item within a cart.
    pub async fn find_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE id = $1 AND cart_id = $2",
        )
        .bind(item_id)
        .bind(cart_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Overwrite an item's price. The promo flow uses this destructively;
    /// the pre-discount price is not retained.
    pub async fn update_item_price(&self, item_id: Uuid, price_minor: i64) -> Result<Option<CartItem>> {
        let item = sqlx::query_as::<_, CartItem>(
            "UPDATE cart_items SET price_minor = $2 WHERE id = $1 RETURNING *",
        )
        .bind(item_id)
        .bind(price_minor)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    /// Remove an item from a cart.
    pub async fn remove_item(&self, cart_id: Uuid, item_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empty a cart.
    pub async fn clear_cart(&self, cart_id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Look up an active promo code.
    pub async fn find_promo(&self, code: &str) -> Result<Option<PromoCode>> {
        let promo = sqlx::query_as::<_, PromoCode>(
            "SELECT * FROM promo_codes WHERE code = $1 AND active = TRUE",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Create a promo code.
    pub async fn create_promo(&self, code: &str, discount_percent: i32) -> Result<PromoCode> {
        info!("Creating promo code {} ({}%)", code, discount_percent);

        let promo = sqlx::query_as::<_, PromoCode>(
            r#"
            INSERT INTO promo_codes (code, discount_percent)
            VALUES ($1, $2)
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(discount_percent)
        .fetch_one(&self.pool)
        .await?;

        Ok(promo)
    }

    /// Deactivate a promo code.
    pub async fn deactivate_promo(&self, code: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE promo_codes SET active = FALSE WHERE code = $1")
            .bind(code)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Snapshot a checked-out cart into an order.
    pub async fn create_order(&self, email: &str, total_minor: i64, item_count: i32) -> Result<Order> {
        info!("Creating order for {} ({} items)", email, item_count);

        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (email, total_minor, item_count)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(total_minor)
        .bind(item_count)
        .fetch_one(&self.pool)
        .await?;

        Ok(order)
    }

    /// A user's orders, newest first.
    pub async fn list_orders(&self, email: &str) -> Result<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE email = $1 ORDER BY created_at DESC",
        )
        .bind(email)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}

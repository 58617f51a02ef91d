//! Cart, order, and promo-code routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use tracing::error;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::cart::{
        AddCartItemRequest, ApplyPromoRequest, ApplyPromoResponse, CreatePromoCodeRequest,
        discounted_price,
    },
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/cart", get(get_cart))
        .route("/api/cart/items", post(add_item))
        .route("/api/cart/items/:id", delete(remove_item))
        .route("/api/cart/promo", post(apply_promo))
        .route("/api/cart/checkout", post(checkout))
        .route("/api/orders", get(list_orders))
        .route("/api/promo", post(create_promo))
        .route("/api/promo/:code", delete(deactivate_promo))
}

/// The caller's cart with its items
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let cart = state
        .cart_repository
        .get_or_create_cart(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to load cart: {}", e);
            ApiError::InternalServerError
        })?;
    let items = state.cart_repository.list_items(cart.id).await.map_err(|e| {
        error!("Failed to list cart items: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(serde_json::json!({
        "cart": cart,
        "items": items,
    })))
}

/// Add an item to the caller's cart
pub async fn add_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<AddCartItemRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.name.trim().is_empty() || payload.item_type.trim().is_empty() {
        return Err(ApiError::Validation(
            "item_type and name are required".to_string(),
        ));
    }
    if payload.price_minor < 0 {
        return Err(ApiError::Validation(
            "price_minor must not be negative".to_string(),
        ));
    }

    let cart = state
        .cart_repository
        .get_or_create_cart(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to load cart: {}", e);
            ApiError::InternalServerError
        })?;
    let item = state
        .cart_repository
        .add_item(cart.id, &payload)
        .await
        .map_err(|e| {
            error!("Failed to add cart item: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Remove an item from the caller's cart
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(item_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let cart = state
        .cart_repository
        .get_or_create_cart(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to load cart: {}", e);
            ApiError::InternalServerError
        })?;
    let removed = state
        .cart_repository
        .remove_item(cart.id, item_id)
        .await
        .map_err(|e| {
            error!("Failed to remove cart item: {}", e);
            ApiError::InternalServerError
        })?;

    if removed {
        Ok(Json(serde_json::json!({"message": "Item removed"})))
    } else {
        Err(ApiError::NotFound("Cart item"))
    }
}

/// Apply a promo code to one line item.
///
/// The discount overwrites the item's stored price; the pre-discount price
/// is returned here and nowhere else afterwards.
pub async fn apply_promo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<ApplyPromoRequest>,
) -> ApiResult<impl IntoResponse> {
    let promo = state
        .cart_repository
        .find_promo(&payload.code)
        .await
        .map_err(|e| {
            error!("Failed to look up promo code: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Promo code"))?;

    let cart = state
        .cart_repository
        .get_or_create_cart(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to load cart: {}", e);
            ApiError::InternalServerError
        })?;
    let item = state
        .cart_repository
        .find_item(cart.id, payload.item_id)
        .await
        .map_err(|e| {
            error!("Failed to load cart item: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Cart item"))?;

    let original_price_minor = item.price_minor;
    let new_price = discounted_price(original_price_minor, promo.discount_percent);

    let item = state
        .cart_repository
        .update_item_price(item.id, new_price)
        .await
        .map_err(|e| {
            error!("Failed to update item price: {}", e);
            ApiError::InternalServerError
        })?
        .ok_or(ApiError::NotFound("Cart item"))?;

    Ok(Json(ApplyPromoResponse {
        item,
        original_price_minor,
        discount_percent: promo.discount_percent,
    }))
}

/// Snapshot the cart into an order and empty it
pub async fn checkout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let cart = state
        .cart_repository
        .get_or_create_cart(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to load cart: {}", e);
            ApiError::InternalServerError
        })?;
    let items = state.cart_repository.list_items(cart.id).await.map_err(|e| {
        error!("Failed to list cart items: {}", e);
        ApiError::InternalServerError
    })?;

    if items.is_empty() {
        return Err(ApiError::Validation("Cart is empty".to_string()));
    }

    let total_minor: i64 = items.iter().map(|i| i.price_minor).sum();
    let order = state
        .cart_repository
        .create_order(&auth.email, total_minor, items.len() as i32)
        .await
        .map_err(|e| {
            error!("Failed to create order: {}", e);
            ApiError::InternalServerError
        })?;

    state.cart_repository.clear_cart(cart.id).await.map_err(|e| {
        error!("Failed to clear cart: {}", e);
        ApiError::InternalServerError
    })?;

    Ok((StatusCode::CREATED, Json(order)))
}

/// The caller's orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let orders = state
        .cart_repository
        .list_orders(&auth.email)
        .await
        .map_err(|e| {
            error!("Failed to list orders: {}", e);
            ApiError::InternalServerError
        })?;

    Ok(Json(orders))
}

/// Create a promo code
pub async fn create_promo(
    State(state): State<AppState>,
    Json(payload): Json<CreatePromoCodeRequest>,
) -> ApiResult<impl IntoResponse> {
    if payload.code.trim().is_empty() {
        return Err(ApiError::Validation("code is required".to_string()));
    }
    if !(1..=100).contains(&payload.discount_percent) {
        return Err(ApiError::Validation(
            "discount_percent must be between 1 and 100".to_string(),
        ));
    }

    let promo = state
        .cart_repository
        .create_promo(&payload.code, payload.discount_percent)
        .await
        .map_err(|e| {
            error!("Failed to create promo code: {}", e);
            ApiError::InternalServerError
        })?;

    Ok((StatusCode::CREATED, Json(promo)))
}

/// Deactivate a promo code
pub async fn deactivate_promo(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let deactivated = state
        .cart_repository
        .deactivate_promo(&code)
        .await
        .map_err(|e| {
            error!("Failed to deactivate promo code: {}", e);
            ApiError::InternalServerError
        })?;

    if deactivated {
        Ok(Json(serde_json::json!({"message": "Promo code deactivated"})))
    } else {
        Err(ApiError::NotFound("Promo code"))
    }
}

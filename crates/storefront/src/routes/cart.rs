//! Cart and order route handlers.
//!
//! Products are identified by the `id` query parameter. Checkout and
//! instant buy accept an optional JSON payment body; an empty body means
//! cash on delivery.

use axum::{
    body::Bytes,
    extract::{Query, State, rejection::QueryRejection},
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use emporium_core::{PaymentMethod, ProductId};

use super::IdParams;
use super::response::ApiResponse;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::services::cart::CartService;
use crate::state::AppState;

/// GET /cart
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn show(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let cart = CartService::new(state.store())
        .get_cart(auth.user_id())
        .await?;

    Ok(ApiResponse::data(json!({
        "count": cart.len(),
        "cart": cart,
    })))
}

/// POST /cart/add?id=
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn add(
    State(state): State<AppState>,
    auth: RequireAuth,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let product_id = product_id(params)?;
    let product_id = CartService::new(state.store())
        .add_to_cart(auth.user_id(), product_id)
        .await?;

    Ok(ApiResponse::with_message(
        "product added to cart successfully",
        json!({ "product_id": product_id }),
    ))
}

/// DELETE /cart/remove?id=
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn remove(
    State(state): State<AppState>,
    auth: RequireAuth,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let product_id = product_id(params)?;
    CartService::new(state.store())
        .remove_from_cart(auth.user_id(), product_id)
        .await?;

    Ok(ApiResponse::message("product removed from cart successfully"))
}

/// POST /cart/checkout
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn checkout(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let payment = payment_method(&body)?;
    let receipt = CartService::new(state.store())
        .checkout(auth.user_id(), payment)
        .await?;

    Ok(ApiResponse::with_message("order placed successfully", receipt))
}

/// POST /cart/instantbuy?id=
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn instant_buy(
    State(state): State<AppState>,
    auth: RequireAuth,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
    body: Bytes,
) -> Result<impl IntoResponse> {
    let product_id = product_id(params)?;
    let payment = payment_method(&body)?;
    let receipt = CartService::new(state.store())
        .instant_buy(auth.user_id(), product_id, payment)
        .await?;

    Ok(ApiResponse::with_message("instant buy successful", receipt))
}

fn product_id(params: std::result::Result<Query<IdParams>, QueryRejection>) -> Result<ProductId> {
    let Query(params) = params?;
    let raw = params.required("product id")?;
    ProductId::parse(raw).map_err(|_| AppError::BadRequest("invalid product id".into()))
}

/// Parse the optional payment body. Empty means "use the default".
fn payment_method(body: &[u8]) -> Result<Option<PaymentMethod>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| AppError::BadRequest(format!("invalid payment body: {e}")))
}

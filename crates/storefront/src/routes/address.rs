//! Address book route handlers.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;
use tracing::instrument;

use emporium_core::AddressId;

use super::IdParams;
use super::response::ApiResponse;
use crate::error::{AppError, Result};
use crate::middleware::RequireAuth;
use crate::models::AddressInput;
use crate::services::address::AddressService;
use crate::state::AppState;

type Body = std::result::Result<Json<AddressInput>, JsonRejection>;

/// GET /address
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn list(State(state): State<AppState>, auth: RequireAuth) -> Result<impl IntoResponse> {
    let addresses = AddressService::new(state.store())
        .list(auth.user_id())
        .await?;
    Ok(ApiResponse::data(addresses))
}

/// POST /address
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn add(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: Body,
) -> Result<impl IntoResponse> {
    let Json(input) = body?;
    let address_id = AddressService::new(state.store())
        .add(auth.user_id(), input)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "address added successfully",
            json!({ "address_id": address_id }),
        ),
    ))
}

/// PUT /address/home
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn edit_home(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: Body,
) -> Result<impl IntoResponse> {
    let Json(input) = body?;
    let address_id = AddressService::new(state.store())
        .edit_home(auth.user_id(), input)
        .await?;

    Ok(ApiResponse::with_message(
        "home address updated successfully",
        json!({ "address_id": address_id }),
    ))
}

/// PUT /address/work
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn edit_work(
    State(state): State<AppState>,
    auth: RequireAuth,
    body: Body,
) -> Result<impl IntoResponse> {
    let Json(input) = body?;
    let address_id = AddressService::new(state.store())
        .edit_work(auth.user_id(), input)
        .await?;

    Ok(ApiResponse::with_message(
        "work address updated successfully",
        json!({ "address_id": address_id }),
    ))
}

/// DELETE /address?id=
#[instrument(skip_all, fields(user_id = %auth.user_id()))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireAuth,
    params: std::result::Result<Query<IdParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = params?;
    let address_id = AddressId::parse(params.required("address id")?)
        .map_err(|_| AppError::BadRequest("invalid address id".into()))?;

    AddressService::new(state.store())
        .delete(auth.user_id(), address_id)
        .await?;

    Ok(ApiResponse::message("address deleted successfully"))
}

//! Product listing and admin product creation.

use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::response::{ApiResponse, Paginated};
use crate::error::Result;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::NewProduct;
use crate::services::catalog::{CatalogService, Pagination};
use crate::state::AppState;

/// `?page=&page_size=`; both kept as strings so garbage falls back to the
/// defaults instead of failing the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// GET /products
#[instrument(skip(state, auth), fields(user_id = %auth.user_id()))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAuth,
    params: std::result::Result<Query<PageParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = params?;
    let pagination = Pagination::from_query(params.page.as_deref(), params.page_size.as_deref());

    let page = CatalogService::new(state.store())
        .list_products(pagination)
        .await?;
    Ok(Paginated::from(page))
}

/// POST /admin/addproduct
#[instrument(skip_all, fields(admin_id = %admin.user_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    body: std::result::Result<Json<NewProduct>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let Json(product) = body?;
    let product_id = CatalogService::new(state.store())
        .add_product(product)
        .await?;

    tracing::info!(%product_id, "Product added");
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "Product added successfully",
            json!({ "product_id": product_id }),
        ),
    ))
}

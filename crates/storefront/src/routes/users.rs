//! Signup, login and public product search.

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

use super::response::{ApiResponse, LoginResponse, Paginated};
use crate::error::{AppError, Result};
use crate::services::auth::{AuthService, LoginRequest, Role, SignupRequest};
use crate::services::catalog::{CatalogService, Pagination, SearchQuery};
use crate::state::AppState;

/// Query string of `/users/search`.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

/// Query string of `/users/productview`.
#[derive(Debug, Default, Deserialize)]
pub struct NameParams {
    pub search: Option<String>,
}

/// POST /users/signup
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    register(&state, body?.0, Role::Customer, "Signed Up Successfully").await
}

/// POST /admin/signup
#[instrument(skip_all)]
pub async fn admin_signup(
    State(state): State<AppState>,
    body: std::result::Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse> {
    register(&state, body?.0, Role::Admin, "Admin Signed Up Successfully").await
}

/// POST /users/login
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<LoginResponse> {
    authenticate(&state, body?.0, Role::Customer).await
}

/// POST /admin/login
#[instrument(skip_all)]
pub async fn admin_login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<LoginResponse> {
    authenticate(&state, body?.0, Role::Admin).await
}

async fn register(
    state: &AppState,
    request: SignupRequest,
    role: Role,
    message: &'static str,
) -> Result<(StatusCode, ApiResponse<serde_json::Value>)> {
    let user_id = AuthService::new(state.store(), state.tokens())
        .register(request, role)
        .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(message, json!({ "user_id": user_id })),
    ))
}

async fn authenticate(state: &AppState, request: LoginRequest, role: Role) -> Result<LoginResponse> {
    let outcome = AuthService::new(state.store(), state.tokens())
        .login(request, role)
        .await?;

    tracing::info!(user_id = %outcome.user_id, admin = role == Role::Admin, "Logged in");
    Ok(LoginResponse::new(outcome.user_id, outcome.tokens))
}

/// GET /users/productview?search=
///
/// Case-insensitive name search over unsold products.
#[instrument(skip(state))]
pub async fn product_view(
    State(state): State<AppState>,
    params: std::result::Result<Query<NameParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = params?;
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("search query parameter is required".into()))?;

    let products = CatalogService::new(state.store())
        .search_by_name(search)
        .await?;
    Ok(ApiResponse::data(products))
}

/// GET /users/search?search=&min_price=&max_price=&page=&page_size=
#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    params: std::result::Result<Query<SearchParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = params?;
    let query = SearchQuery::parse(
        params.search.as_deref(),
        params.min_price.as_deref(),
        params.max_price.as_deref(),
    )?;
    let pagination = Pagination::from_query(params.page.as_deref(), params.page_size.as_deref());

    let page = CatalogService::new(state.store())
        .search(query, pagination)
        .await?;
    Ok(Paginated::from(page))
}

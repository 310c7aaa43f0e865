//! JSON response envelopes.
//!
//! Every success body has `"success": true`; errors are rendered by
//! `AppError` with `"success": false`.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use emporium_core::UserId;

use crate::services::auth::TokenPair;
use crate::services::catalog::Page;

/// Standard envelope: `{"success", "message"?, "data"?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub const fn data(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn with_message(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// A success carrying only a message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Pagination block of a paginated response.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PageInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// `{"success", "data", "pagination"}`.
#[derive(Debug, Serialize)]
pub struct Paginated<T: Serialize> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: PageInfo,
}

impl<T: Serialize> From<Page<T>> for Paginated<T> {
    fn from(page: Page<T>) -> Self {
        let pagination = PageInfo {
            page: page.pagination.page,
            page_size: page.pagination.page_size,
            total: page.total,
            total_pages: page.total_pages(),
        };
        Self {
            success: true,
            data: page.items,
            pagination,
        }
    }
}

impl<T: Serialize> IntoResponse for Paginated<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// `{"success", "message", "user_id", "token", "refresh_token"}`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub user_id: UserId,
    pub token: String,
    pub refresh_token: String,
}

impl LoginResponse {
    #[must_use]
    pub fn new(user_id: UserId, tokens: TokenPair) -> Self {
        Self {
            success: true,
            message: "Logged In Successfully",
            user_id,
            token: tokens.token,
            refresh_token: tokens.refresh_token,
        }
    }
}

impl IntoResponse for LoginResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

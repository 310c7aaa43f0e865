//! Authentication extractors.
//!
//! Clients send the access token in a header named `token`. Handlers that
//! need a signed-in user take `RequireAuth`; admin handlers take
//! `RequireAdmin`, which also checks the stored account.

use axum::{extract::FromRequestParts, http::request::Parts};

use emporium_core::UserId;

use crate::db::UserKey;
use crate::error::{AppError, set_sentry_user};
use crate::models::User;
use crate::services::auth::Claims;
use crate::state::AppState;

/// The request header carrying the access token.
pub const TOKEN_HEADER: &str = "token";

/// Extractor that requires a valid access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(claims): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", claims.first_name)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RequireAuth(pub Claims);

impl RequireAuth {
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0.user_id
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| AppError::Unauthorized("No authorization header provided".into()))?;

        let claims = state.tokens().validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            AppError::from(e)
        })?;

        set_sentry_user(&claims.user_id, Some(&claims.email));
        Ok(Self(claims))
    }
}

/// Extractor that requires a valid token belonging to an admin account.
///
/// The stored user is checked on every request, so revoking admin rights
/// takes effect without waiting for tokens to expire.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub User);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireAuth(claims) = RequireAuth::from_request_parts(parts, state).await?;

        let user = state
            .store()
            .find_user(UserKey::Id(claims.user_id))
            .await?
            .ok_or_else(|| AppError::NotFound("user not found".into()))?;

        if !user.is_admin {
            tracing::warn!(user_id = %user.user_id, "Admin route denied");
            return Err(AppError::Forbidden(
                "access denied: admin privileges required".into(),
            ));
        }

        Ok(Self(user))
    }
}

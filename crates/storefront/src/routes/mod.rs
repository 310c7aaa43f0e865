//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness
//! GET    /health/ready                - Readiness (store ping)
//!
//! # Under /api/v1
//! POST   /users/signup                - Customer signup
//! POST   /users/login                 - Customer login
//! POST   /admin/signup                - Admin signup
//! POST   /admin/login                 - Admin login
//! GET    /users/productview?search=   - Name search
//! GET    /users/search                - Name and price search, paginated
//!
//! # Requires `token` header
//! GET    /products                    - Paginated listing
//! POST   /admin/addproduct            - Create product (admin)
//! GET    /cart                        - Cart contents
//! POST   /cart/add?id=                - Add to cart
//! DELETE /cart/remove?id=             - Remove from cart
//! POST   /cart/checkout               - Checkout the whole cart
//! POST   /cart/instantbuy?id=         - Buy one product directly
//! GET    /address                     - List addresses
//! POST   /address                     - Add address
//! PUT    /address/home                - Edit home address
//! PUT    /address/work                - Edit work address
//! DELETE /address?id=                 - Delete address
//! ```

pub mod address;
pub mod cart;
pub mod health;
pub mod products;
pub mod response;
pub mod users;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// `?id=` query shared by cart and address routes.
#[derive(Debug, Default, Deserialize)]
pub struct IdParams {
    pub id: Option<String>,
}

impl IdParams {
    /// The trimmed id, or a 400 naming what was expected.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if the id is missing or blank.
    pub fn required(&self, what: &str) -> Result<&str> {
        self.id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::BadRequest(format!("{what} is required")))
    }
}

/// Create the user routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::signup))
        .route("/login", post(users::login))
        .route("/productview", get(users::product_view))
        .route("/search", get(users::search))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(users::admin_signup))
        .route("/login", post(users::admin_login))
        .route("/addproduct", post(products::add))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/remove", delete(cart::remove))
        .route("/checkout", post(cart::checkout))
        .route("/instantbuy", post(cart::instant_buy))
}

/// Create the address routes router.
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(address::list).post(address::add).delete(address::delete),
        )
        .route("/home", put(address::edit_home))
        .route("/work", put(address::edit_work))
}

/// Create the versioned API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/users", user_routes())
        .nest("/admin", admin_routes())
        .route("/products", get(products::index))
        .nest("/cart", cart_routes())
        .nest("/address", address_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", api_routes())
}

//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! EMPORIUM_ADMIN_PASSWORD=... emporium-cli admin create \
//!     -e admin@example.com -p 9876543210 --first-name Ada --last-name Admin
//! ```
//!
//! # Environment Variables
//!
//! - `EMPORIUM_ADMIN_PASSWORD` - Password for the new account

use secrecy::{ExposeSecret, SecretString};

use emporium_core::UserId;
use emporium_storefront::services::auth::{AuthService, Role, SignupRequest, TokenIssuer};

use super::{CliError, connect};

/// Create a new admin account through the same path as `/admin/signup`.
///
/// # Errors
///
/// Returns an error if the password is not set, a field fails validation,
/// or the email or phone is already registered.
pub async fn create_user(
    email: &str,
    phone: &str,
    first_name: &str,
    last_name: &str,
) -> Result<UserId, CliError> {
    dotenvy::dotenv().ok();

    let password = std::env::var("EMPORIUM_ADMIN_PASSWORD")
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("EMPORIUM_ADMIN_PASSWORD"))?;

    let (config, store) = connect().await?;
    let tokens = TokenIssuer::new(&config.token_secret, config.token_ttl);

    tracing::info!("Creating admin account: {}", email);

    let request = SignupRequest {
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
        email: email.to_owned(),
        phone: phone.to_owned(),
        password: password.expose_secret().to_owned(),
    };
    let user_id = AuthService::new(&store, &tokens)
        .register(request, Role::Admin)
        .await?;

    tracing::info!("Admin account created successfully! ID: {}, Email: {}", user_id, email);

    Ok(user_id)
}

//! Authentication service.
//!
//! Password signup and login for customers and admins. Successful signup and
//! login both issue a token pair and persist it on the user document.

mod error;
pub mod tokens;

pub use error::AuthError;
pub use tokens::{Claims, TokenError, TokenIssuer, TokenPair};

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use serde::Deserialize;

use emporium_core::{Email, Phone, UserId};

use crate::db::{Store, StoreError, UserKey, UserUpdate};
use crate::models::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 6;
/// Bounds on first and last name length, in characters.
const NAME_LENGTH: std::ops::RangeInclusive<usize> = 2..=30;

/// Which kind of account a signup or login is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Customer,
    Admin,
}

/// Signup request body.
///
/// Fields default to empty so a missing field is reported by validation
/// rather than as a JSON error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

/// Login request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user_id: UserId,
    pub tokens: TokenPair,
}

/// Authentication service.
pub struct AuthService<'a> {
    store: &'a dyn Store,
    tokens: &'a TokenIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(store: &'a dyn Store, tokens: &'a TokenIssuer) -> Self {
        Self { store, tokens }
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if a field is invalid.
    /// Returns `AuthError::UserAlreadyExists` if the email is registered.
    /// Returns `AuthError::PhoneInUse` if the phone number is registered.
    pub async fn register(&self, request: SignupRequest, role: Role) -> Result<UserId, AuthError> {
        let first_name = validate_name("first_name", &request.first_name)?;
        let last_name = validate_name("last_name", &request.last_name)?;
        let email = Email::parse(&request.email)
            .map_err(|e| AuthError::Validation(format!("email: {e}")))?;
        let phone = Phone::parse(&request.phone)
            .map_err(|e| AuthError::Validation(format!("phone: {e}")))?;
        validate_password(&request.password)?;

        if self.store.find_user(UserKey::Email(&email)).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }
        if self.store.find_user(UserKey::Phone(&phone)).await?.is_some() {
            return Err(AuthError::PhoneInUse);
        }

        let password = hash_password(&request.password)?;
        let now = Utc::now();
        let mut user = User {
            user_id: UserId::generate(),
            first_name,
            last_name,
            email,
            phone,
            password,
            is_admin: role == Role::Admin,
            token: String::new(),
            refresh_token: String::new(),
            created_at: now,
            updated_at: now,
            address_details: Vec::new(),
            user_cart: Vec::new(),
            order_status: Vec::new(),
        };
        let pair = self.tokens.issue_pair(&user)?;
        user.token = pair.token;
        user.refresh_token = pair.refresh_token;

        self.store.insert_user(&user).await.map_err(|e| match e {
            // Lost a race with a concurrent signup
            StoreError::Conflict(key) if key.contains("phone") => AuthError::PhoneInUse,
            StoreError::Conflict(_) => AuthError::UserAlreadyExists,
            other => AuthError::Store(other),
        })?;

        tracing::info!(user_id = %user.user_id, admin = user.is_admin, "User registered");
        Ok(user.user_id)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    /// Returns `AuthError::NotAdmin` for an admin login on a customer account.
    pub async fn login(&self, request: LoginRequest, role: Role) -> Result<LoginOutcome, AuthError> {
        let email = Email::parse(&request.email).map_err(|_| AuthError::InvalidCredentials)?;

        let user = self
            .store
            .find_user(UserKey::Email(&email))
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(&request.password, &user.password) {
            return Err(AuthError::InvalidCredentials);
        }

        if role == Role::Admin && !user.is_admin {
            tracing::warn!(user_id = %user.user_id, "Admin login attempted by non-admin");
            return Err(AuthError::NotAdmin);
        }

        let pair = self.tokens.issue_pair(&user)?;
        let outcome = self
            .store
            .update_user(
                user.user_id,
                UserUpdate::default().tokens(pair.token.clone(), pair.refresh_token.clone()),
            )
            .await?;
        if outcome.matched == 0 {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(LoginOutcome {
            user_id: user.user_id,
            tokens: pair,
        })
    }
}

/// Validate a name field and return it trimmed.
fn validate_name(field: &str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if !NAME_LENGTH.contains(&value.chars().count()) {
        return Err(AuthError::Validation(format!(
            "{field} must be between {} and {} characters",
            NAME_LENGTH.start(),
            NAME_LENGTH.end()
        )));
    }
    Ok(value.to_owned())
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
///
/// An unparseable hash counts as a mismatch.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;
    use crate::config::TokenTtl;
    use crate::db::MemoryStore;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(
            &SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            TokenTtl::default(),
        )
    }

    fn signup(email: &str, phone: &str) -> SignupRequest {
        SignupRequest {
            first_name: "Asha".into(),
            last_name: "Menon".into(),
            email: email.into(),
            phone: phone.into(),
            password: "s3cret!".into(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("hunter22").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        assert!(!verify_password("hunter22", "not-a-phc-string"));
    }

    #[test]
    fn test_validate_name_bounds() {
        assert!(validate_name("first_name", "A").is_err());
        assert!(validate_name("first_name", &"a".repeat(31)).is_err());
        assert_eq!(validate_name("first_name", "  Jo ").unwrap(), "Jo");
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let tokens = issuer();
        let auth = AuthService::new(&store, &tokens);

        let user_id = auth
            .register(signup("asha@example.com", "9876543210"), Role::Customer)
            .await
            .unwrap();

        let outcome = auth
            .login(login("asha@example.com", "s3cret!"), Role::Customer)
            .await
            .unwrap();
        assert_eq!(outcome.user_id, user_id);
        assert_eq!(tokens.validate(&outcome.tokens.token).unwrap().user_id, user_id);

        let stored = store.find_user(UserKey::Id(user_id)).await.unwrap().unwrap();
        assert_eq!(stored.token, outcome.tokens.token);
        assert!(!stored.is_admin);
        assert_ne!(stored.password, "s3cret!");
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let store = MemoryStore::new();
        let tokens = issuer();
        let auth = AuthService::new(&store, &tokens);
        auth.register(signup("asha@example.com", "9876543210"), Role::Customer)
            .await
            .unwrap();

        let same_email = auth
            .register(signup("asha@example.com", "9999999999"), Role::Customer)
            .await;
        assert!(matches!(same_email, Err(AuthError::UserAlreadyExists)));

        let same_phone = auth
            .register(signup("other@example.com", "9876543210"), Role::Customer)
            .await;
        assert!(matches!(same_phone, Err(AuthError::PhoneInUse)));
    }

    #[tokio::test]
    async fn test_register_validates_fields() {
        let store = MemoryStore::new();
        let tokens = issuer();
        let auth = AuthService::new(&store, &tokens);

        let mut short_password = signup("a@example.com", "9876543210");
        short_password.password = "12345".into();
        let bad_email = signup("not-an-email", "9876543210");
        let bad_phone = signup("a@example.com", "12-34");

        for request in [short_password, bad_email, bad_phone] {
            let result = auth.register(request, Role::Customer).await;
            assert!(matches!(result, Err(AuthError::Validation(_))));
        }
    }

    #[tokio::test]
    async fn test_login_rejects_wrong_credentials() {
        let store = MemoryStore::new();
        let tokens = issuer();
        let auth = AuthService::new(&store, &tokens);
        auth.register(signup("asha@example.com", "9876543210"), Role::Customer)
            .await
            .unwrap();

        let wrong_password = auth
            .login(login("asha@example.com", "nope-nope"), Role::Customer)
            .await;
        assert!(matches!(wrong_password, Err(AuthError::InvalidCredentials)));

        let unknown = auth
            .login(login("ghost@example.com", "s3cret!"), Role::Customer)
            .await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_admin_login_requires_admin_account() {
        let store = MemoryStore::new();
        let tokens = issuer();
        let auth = AuthService::new(&store, &tokens);
        auth.register(signup("asha@example.com", "9876543210"), Role::Customer)
            .await
            .unwrap();
        auth.register(signup("boss@example.com", "9876543211"), Role::Admin)
            .await
            .unwrap();

        let customer = auth
            .login(login("asha@example.com", "s3cret!"), Role::Admin)
            .await;
        assert!(matches!(customer, Err(AuthError::NotAdmin)));

        let admin = auth
            .login(login("boss@example.com", "s3cret!"), Role::Admin)
            .await;
        assert!(admin.is_ok());
    }
}

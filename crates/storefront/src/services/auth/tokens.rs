//! Signed bearer tokens (HS256 JWT).
//!
//! Tokens carry the user's identity so authenticated routes need no store
//! lookup. An access token and a refresh token are issued together; the
//! `token_type` claim keeps a refresh token from being used as an access
//! token.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use emporium_core::UserId;

use crate::config::TokenTtl;
use crate::models::User;

/// Errors from token validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Not a well-formed HS256 token.
    #[error("malformed token")]
    Malformed,

    /// The signature does not match.
    #[error("invalid token signature")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,

    /// A refresh token was presented where an access token is required.
    #[error("wrong token type")]
    WrongType,

    /// The token could not be produced.
    #[error("token signing failed: {0}")]
    Signing(String),
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            _ => Self::Malformed,
        }
    }
}

/// Which half of a pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims embedded in every token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub user_id: UserId,
    pub token_type: TokenType,
    /// Issued at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// A freshly issued access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// Issues and validates tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_secs: i64,
    refresh_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("secret", &"[REDACTED]")
            .field("access_secs", &self.access_secs)
            .field("refresh_secs", &self.refresh_secs)
            .finish()
    }
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: TokenTtl) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(key),
            decoding: DecodingKey::from_secret(key),
            validation,
            access_secs: seconds(ttl.access),
            refresh_secs: seconds(ttl.refresh),
        }
    }

    /// Issue an access/refresh pair for `user`.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Signing` if the claims cannot be encoded.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        self.issue_pair_at(user, Utc::now())
    }

    fn issue_pair_at(&self, user: &User, now: DateTime<Utc>) -> Result<TokenPair, TokenError> {
        let claims = |token_type, ttl_secs: i64| Claims {
            email: user.email.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            user_id: user.user_id,
            token_type,
            iat: now.timestamp(),
            exp: now.timestamp().saturating_add(ttl_secs),
        };

        Ok(TokenPair {
            token: self.sign(&claims(TokenType::Access, self.access_secs))?,
            refresh_token: self.sign(&claims(TokenType::Refresh, self.refresh_secs))?,
        })
    }

    /// Validate an access token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns the first check that fails: structure and algorithm,
    /// signature, expiry, then token type.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let claims =
            jsonwebtoken::decode::<Claims>(token.trim(), &self.decoding, &self.validation)?.claims;
        if claims.token_type != TokenType::Access {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }
}

fn seconds(ttl: std::time::Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX)
}

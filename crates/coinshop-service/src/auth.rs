//! Authentication: access tokens, password hashing and the request extractor.
//!
//! - [`TokenService`] issues and verifies HS256 JWTs whose subject is a username.
//! - [`hash_password`] / [`verify_password`] wrap Argon2id and run on the blocking pool.
//! - [`sign_in`] is the login-or-register flow behind `POST /api/auth`.
//! - [`AuthUser`] pulls the verified username out of `Authorization: Bearer <jwt>`.

use std::sync::Arc;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use coinshop_core::{Account, ShopError, Username};
use coinshop_store::Store;

use crate::error::ApiError;
use crate::ledger;
use crate::state::AppState;

/// An authenticated user extracted from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The verified username.
    pub username: Username,
}

#[async_trait]
impl<S: Store> FromRequestParts<Arc<AppState<S>>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState<S>>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ApiError::Unauthorized)?;

        let username = state.tokens.verify(token)?;
        Ok(Self { username })
    }
}

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username).
    pub sub: String,
    /// Issued at (seconds since the epoch).
    pub iat: i64,
    /// Expiration time (seconds since the epoch).
    pub exp: i64,
}

/// Issues and verifies access tokens with a shared HS256 secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_seconds: i64,
}

impl TokenService {
    /// Create a token service from a signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &str, ttl_seconds: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl_seconds,
        }
    }

    /// Issue a token asserting `username`.
    pub fn issue(&self, username: &Username) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp();
        self.encode(&Claims {
            sub: username.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
        })
    }

    fn encode(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to sign access token");
            ApiError::Internal("failed to sign access token".into())
        })
    }

    /// Verify a token and return the username it asserts.
    pub fn verify(&self, token: &str) -> Result<Username, ShopError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            ShopError::InvalidCredential
        })?;

        Username::new(data.claims.sub).map_err(|_| ShopError::InvalidCredential)
    }
}

/// Hash a password with Argon2id and a random salt, returning a PHC string.
pub async fn hash_password(password: &str) -> Result<String, ApiError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut rand::rngs::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password hashing task failed: {e}")))?
}

/// Check a password against a stored PHC hash.
pub async fn verify_password(password: &str, hash: &str) -> Result<(), ApiError> {
    let password = password.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| ApiError::Internal(format!("stored password hash is invalid: {e}")))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| ApiError::from(ShopError::InvalidCredential))
    })
    .await
    .map_err(|e| ApiError::Internal(format!("password verification task failed: {e}")))?
}

/// Log in an existing account or register a new one.
///
/// The first sign-in for a username creates the account with the starting balance.
/// Later sign-ins must present the same password. If two first sign-ins race, the
/// loser's insert fails on the unique key and is retried once as a plain login.
pub async fn sign_in<S: Store>(
    store: &S,
    username: &Username,
    password: &str,
) -> Result<Account, ApiError> {
    if let Some(account) = store.get_account(username).await? {
        verify_password(password, &account.password_hash).await?;
        return Ok(account);
    }

    let hash = hash_password(password).await?;
    let account = match ledger::provision(store, username, hash.clone()).await {
        Ok(account) => account,
        Err(ShopError::AccountAlreadyExists { .. }) => {
            tracing::debug!(username = %username, "Lost registration race, retrying as login");
            store
                .get_account(username)
                .await?
                .ok_or_else(|| ShopError::AccountNotFound {
                    username: username.to_string(),
                })?
        }
        Err(e) => return Err(e.into()),
    };

    if account.password_hash != hash {
        verify_password(password, &account.password_hash).await?;
    }
    Ok(account)
}

//! Sign-in handler.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use coinshop_core::{ShopError, Username};
use coinshop_store::Store;

use crate::auth::sign_in;
use crate::error::ApiError;
use crate::state::AppState;

/// Sign-in request.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Account username; created on first sign-in.
    #[serde(default)]
    pub username: String,
    /// Account password.
    #[serde(default)]
    pub password: String,
}

/// Sign-in response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
}

/// Sign in, registering the account on first use.
pub async fn authenticate<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(body) = body?;

    if body.password.is_empty() {
        return Err(ShopError::InvalidInput("username and password are required".into()).into());
    }
    let username = Username::new(body.username).map_err(ShopError::from)?;

    let account = sign_in(state.store.as_ref(), &username, &body.password).await?;
    let token = state.tokens.issue(&account.username)?;

    tracing::debug!(username = %account.username, "Token issued");

    Ok(Json(AuthResponse { token }))
}

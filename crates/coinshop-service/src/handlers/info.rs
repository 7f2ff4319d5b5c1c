//! Account info handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use coinshop_core::AccountSummary;
use coinshop_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::ledger;
use crate::state::AppState;

/// Get the caller's balance, inventory and coin history.
pub async fn get_info<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
) -> Result<Json<AccountSummary>, ApiError> {
    let summary = ledger::account_summary(state.store.as_ref(), &auth.username).await?;
    Ok(Json(summary))
}

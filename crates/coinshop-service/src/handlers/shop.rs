//! Purchase and transfer handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;

use coinshop_store::Store;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::ledger::{self, PurchaseReceipt, TransferReceipt};
use crate::state::AppState;

/// Coin transfer request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient username.
    #[serde(default)]
    pub to_user: String,
    /// Coins to send.
    #[serde(default)]
    pub amount: i64,
}

/// Send coins to another account.
pub async fn send_coin<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
    body: Result<Json<SendCoinRequest>, JsonRejection>,
) -> Result<Json<TransferReceipt>, ApiError> {
    let Json(body) = body?;

    let receipt =
        ledger::transfer(state.store.as_ref(), &auth.username, &body.to_user, body.amount).await?;
    Ok(Json(receipt))
}

/// Buy one unit of a catalog item.
pub async fn buy_item<S: Store>(
    State(state): State<Arc<AppState<S>>>,
    auth: AuthUser,
    Path(item): Path<String>,
) -> Result<Json<PurchaseReceipt>, ApiError> {
    let receipt = ledger::purchase(state.store.as_ref(), &auth.username, &item).await?;
    Ok(Json(receipt))
}

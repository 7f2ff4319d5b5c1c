//! Coinshop HTTP API Service.
//!
//! This crate provides the HTTP API for the coinshop merch store:
//!
//! - Sign-in with automatic registration and a starting balance
//! - Buying catalog items with coins
//! - Sending coins to other users
//! - Balance, inventory and coin history
//!
//! # Authentication
//!
//! `POST /api/auth` exchanges a username and password for an HS256 bearer token.
//! Every other `/api` route requires `Authorization: Bearer <token>`.
//!
//! # Storage
//!
//! The service is generic over [`coinshop_store::Store`]. The binary picks PostgreSQL
//! or the in-memory store at startup from `STORE_BACKEND`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handler needs async for routing

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod routes;
pub mod state;

pub use config::{ConfigError, ServiceConfig, StoreBackend};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;

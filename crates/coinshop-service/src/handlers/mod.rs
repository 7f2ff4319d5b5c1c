//! API handlers.

pub mod auth;
pub mod health;
pub mod info;
pub mod shop;

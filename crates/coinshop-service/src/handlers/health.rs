//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

/// Body of `GET /health`. Build metadata only; the store is not touched.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `"ok"` while the process can answer.
    pub status: &'static str,
    /// Cargo package name of the running binary.
    pub service: &'static str,
    /// Cargo package version.
    pub version: &'static str,
}

/// `GET /health`, public.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

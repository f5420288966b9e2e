//! # Axum Helpers
//!
//! Shared utilities for building Axum services in this workspace.
//!
//! ## Modules
//!
//! - **[`errors`]**: the structured error body every endpoint speaks
//! - **[`extractors`]**: custom extractors (validated JSON, UUID path)
//! - **[`http`]**: cross-cutting HTTP middleware (CORS, security headers)
//! - **[`server`]**: router assembly, health checks, graceful shutdown

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use errors::ErrorResponse;
pub use extractors::{UuidPath, ValidatedJson};
pub use http::{cors_layer, security_headers};
pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_app, create_production_app,
    create_router, health_router, run_health_checks, shutdown_signal,
};

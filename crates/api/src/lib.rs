//! HTTP API layer for munreg.
//!
//! This crate provides the registration and payment REST API:
//!
//! - **Endpoints**: registration lifecycle, payment gateway flows, exports
//! - **Auth**: static-key gate behind [`auth::AdminGate`] and extractors
//! - **State**: service wiring via [`AppState`]
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod auth;
pub mod endpoints;
pub mod state;

pub use auth::{AdminGate, AdminKey, ExportKey};
pub use endpoints::router;
pub use state::AppState;

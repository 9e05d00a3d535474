//! API endpoints.

mod export;
mod payment;
mod registration;

use axum::Router;

use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/registration", registration::router())
        .nest("/payment", payment::router())
        .nest("/export", export::router())
}

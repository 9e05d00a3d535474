//! Export endpoints.

use axum::{
    Json, Router,
    extract::State,
    http::header,
    response::IntoResponse,
    routing::get,
};
use munreg_common::AppResult;

use crate::{auth::ExportKey, state::AppState};

/// Create export router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registrations.csv", get(export_csv))
        .route("/registrations.json", get(export_json))
}

/// Full-table CSV dump. Export key only.
pub(super) async fn export_csv(
    _key: ExportKey,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let csv = state.export_service.export_csv().await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"registrations.csv\"",
            ),
        ],
        csv,
    ))
}

/// Full-table JSON dump plus the financial summary. Export key only.
pub(super) async fn export_json(
    _key: ExportKey,
    State(state): State<AppState>,
) -> AppResult<Json<serde_json::Value>> {
    let dump = state.export_service.export_json().await?;
    Ok(Json(dump))
}

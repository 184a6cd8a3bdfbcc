//! Axum route handlers for the demo Analysis API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analysis::report::AnalysisReport;
use crate::analysis::service::submit;
use crate::analysis::session::SessionSnapshot;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Omit on the first submission of a page load; reuse the returned id after.
    pub session_id: Option<Uuid>,
    pub business_plan: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub session_id: Uuid,
    pub report: AnalysisReport,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/demo/analyze
///
/// Runs one analysis for the session. 400 on an empty plan, 409 while the
/// session already has one in flight, 502 with the generic message on any
/// analysis failure.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let session_id = request.session_id.unwrap_or_else(Uuid::new_v4);

    let report = submit(
        &state.sessions,
        state.generator.clone(),
        session_id,
        &request.business_plan,
    )
    .await?;

    Ok(Json(AnalyzeResponse { session_id, report }))
}

/// GET /api/v1/demo/sessions/:id
///
/// Current phase of a session plus its last report, if any.
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<SessionSnapshot>, AppError> {
    state
        .sessions
        .snapshot(session_id)
        .await
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))
}

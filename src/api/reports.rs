//! Reporting and export endpoints

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;

use super::AuthenticatedUser;

/// One labelled count
#[derive(Debug, Serialize, ToSchema)]
pub struct StatEntry {
    pub label: String,
    pub value: i64,
}

/// Asset inventory statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetStats {
    pub total: i64,
    pub by_status: Vec<StatEntry>,
    pub by_category: Vec<StatEntry>,
    pub total_value: Decimal,
}

/// Assignment statistics
#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentStats {
    pub active: i64,
    pub overdue: i64,
}

/// Combined stats response
#[derive(Debug, Serialize, ToSchema)]
pub struct StatsResponse {
    pub assets: AssetStats,
    pub assignments: AssignmentStats,
}

/// Inventory and assignment statistics
#[utoipa::path(
    get,
    path = "/reports/stats",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Inventory statistics", body = StatsResponse)
    )
)]
pub async fn get_stats(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<StatsResponse>> {
    let stats = state.services.reports.get_stats().await?;
    Ok(Json(stats))
}

/// Export non-deleted assets as CSV
#[utoipa::path(
    get,
    path = "/reports/assets.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Asset inventory CSV", content_type = "text/csv")
    )
)]
pub async fn export_assets_csv(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let csv = state.services.reports.export_assets_csv().await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    ))
}

/// Export all assignments as CSV
#[utoipa::path(
    get,
    path = "/reports/assignments.csv",
    tag = "reports",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Assignment history CSV", content_type = "text/csv")
    )
)]
pub async fn export_assignments_csv(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<impl IntoResponse> {
    let csv = state.services.reports.export_assignments_csv().await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/csv; charset=utf-8")],
        csv,
    ))
}

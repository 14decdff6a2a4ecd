//! Audit trail endpoints

use axum::{
    extract::{Query, State},
    Json,
};

use crate::{
    error::AppResult,
    models::audit::{AuditLog, AuditLogQuery},
};

use super::AuthenticatedUser;

/// List audit entries, newest first (admin tier)
#[utoipa::path(
    get,
    path = "/audit-logs",
    tag = "audit",
    security(("bearer_auth" = [])),
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Audit entries", body = Vec<AuditLog>),
        (status = 403, description = "Insufficient permissions")
    )
)]
pub async fn list_audit_logs(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Query(query): Query<AuditLogQuery>,
) -> AppResult<Json<Vec<AuditLog>>> {
    claims.require_admin()?;
    let logs = state.services.audit.list(&query).await?;
    Ok(Json(logs))
}

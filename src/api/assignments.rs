//! Assignment lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::assignment::{
        Assignment, AssignmentDetails, AssignmentQuery, BulkAssignmentRequest,
        BulkAssignmentResult, CreateAssignment, ReturnAssignment, UpdateAssignment,
    },
};

use super::AuthenticatedUser;

/// List assignments with filters
#[utoipa::path(
    get,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(AssignmentQuery),
    responses(
        (status = 200, description = "Assignment list", body = Vec<AssignmentDetails>)
    )
)]
pub async fn list_assignments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AssignmentQuery>,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    let assignments = state.services.assignments.list(&query).await?;
    Ok(Json(assignments))
}

/// Get assignment by ID
#[utoipa::path(
    get,
    path = "/assignments/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment details", body = Assignment),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn get_assignment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Assignment>> {
    let assignment = state.services.assignments.get_by_id(id).await?;
    Ok(Json(assignment))
}

/// Active assignments held by a user
#[utoipa::path(
    get,
    path = "/users/{id}/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's active assignments", body = Vec<AssignmentDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_assignments(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i32>,
) -> AppResult<Json<Vec<AssignmentDetails>>> {
    let assignments = state.services.assignments.list_for_user(user_id).await?;
    Ok(Json(assignments))
}

/// Assign an asset to a user
#[utoipa::path(
    post,
    path = "/assignments",
    tag = "assignments",
    security(("bearer_auth" = [])),
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Assignment created", body = Assignment),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Asset or user not found"),
        (status = 409, description = "Asset already assigned"),
        (status = 422, description = "Asset not available or user at cap")
    )
)]
pub async fn create_assignment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAssignment>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    let assignment = state.services.assignments.create(data, &claims).await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

/// Edit purpose/notes/expected return date/status of an assignment
#[utoipa::path(
    put,
    path = "/assignments/{id}",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = UpdateAssignment,
    responses(
        (status = 200, description = "Assignment updated", body = Assignment),
        (status = 404, description = "Assignment not found")
    )
)]
pub async fn update_assignment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAssignment>,
) -> AppResult<Json<Assignment>> {
    let assignment = state.services.assignments.update(id, data, &claims).await?;
    Ok(Json(assignment))
}

/// Return an assigned asset
#[utoipa::path(
    post,
    path = "/assignments/{id}/return",
    tag = "assignments",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Assignment ID")),
    request_body = ReturnAssignment,
    responses(
        (status = 200, description = "Asset returned", body = Assignment),
        (status = 404, description = "Assignment not found"),
        (status = 422, description = "Assignment is not active")
    )
)]
pub async fn return_assignment(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(details): Json<ReturnAssignment>,
) -> AppResult<Json<Assignment>> {
    let assignment = state
        .services
        .assignments
        .return_assignment(id, details, &claims)
        .await?;
    Ok(Json(assignment))
}

/// Run one operation over up to 50 assignments, continuing past per-item failures
#[utoipa::path(
    post,
    path = "/assignments/bulk",
    tag = "assignments",
    security(("bearer_auth" = [])),
    request_body = BulkAssignmentRequest,
    responses(
        (status = 200, description = "Bulk result with per-item outcome", body = BulkAssignmentResult),
        (status = 400, description = "Unknown ids or too many items")
    )
)]
pub async fn bulk_assignment_operations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BulkAssignmentRequest>,
) -> AppResult<Json<BulkAssignmentResult>> {
    let result = state.services.assignments.bulk(request, &claims).await?;
    Ok(Json(result))
}

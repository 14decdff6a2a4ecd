//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{assets, assignments, audit, auth, health, reports, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TrackIT API",
        version = "0.9.0",
        description = "IT asset inventory and assignment tracking REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Assets
        assets::list_assets,
        assets::get_asset,
        assets::create_asset,
        assets::update_asset,
        assets::delete_asset,
        assets::bulk_asset_operations,
        // Assignments
        assignments::list_assignments,
        assignments::get_assignment,
        assignments::get_user_assignments,
        assignments::create_assignment,
        assignments::update_assignment,
        assignments::return_assignment,
        assignments::bulk_assignment_operations,
        // Users
        users::list_users,
        users::get_user,
        // Audit
        audit::list_audit_logs,
        // Reports
        reports::get_stats,
        reports::export_assets_csv,
        reports::export_assignments_csv,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Assets
            crate::models::asset::Asset,
            crate::models::asset::CreateAsset,
            crate::models::asset::UpdateAsset,
            crate::models::asset::AssetListResponse,
            crate::models::asset::BulkAssetOperation,
            crate::models::asset::BulkAssetData,
            crate::models::asset::BulkAssetRequest,
            crate::models::asset::BulkAssetResult,
            crate::models::asset::BulkItemError,
            // Assignments
            crate::models::assignment::Assignment,
            crate::models::assignment::AssignmentDetails,
            crate::models::assignment::CreateAssignment,
            crate::models::assignment::UpdateAssignment,
            crate::models::assignment::ReturnAssignment,
            crate::models::assignment::BulkAssignmentOperation,
            crate::models::assignment::BulkAssignmentData,
            crate::models::assignment::BulkAssignmentRequest,
            crate::models::assignment::BulkAssignmentResult,
            // Users
            crate::models::user::User,
            users::UserListResponse,
            // Audit
            crate::models::audit::AuditLog,
            // Enums
            crate::models::enums::AssetCategory,
            crate::models::enums::AssetStatus,
            crate::models::enums::AssetCondition,
            crate::models::enums::AssignmentStatus,
            crate::models::enums::UserRole,
            crate::models::enums::AuditAction,
            // Reports
            reports::StatsResponse,
            reports::AssetStats,
            reports::AssignmentStats,
            reports::StatEntry,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "assets", description = "Asset inventory management"),
        (name = "assignments", description = "Assignment lifecycle"),
        (name = "users", description = "User directory"),
        (name = "audit", description = "Audit trail"),
        (name = "reports", description = "Statistics and exports")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

//! Assignment model and related request types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::asset::BulkItemError;
use super::enums::{AssetCondition, AssignmentStatus};

/// Assignment record from database: one asset bound to one user over a
/// time interval. At most one row with `is_active = true` exists per asset.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Assignment {
    pub id: i32,
    pub asset_id: i32,
    pub user_id: i32,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    /// Expected return date; null means indefinite
    pub expected_return_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub actual_return_condition: Option<AssetCondition>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub return_notes: Option<String>,
    pub assigned_by: Option<i32>,
    pub returned_by: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Assignment with asset and user context for list/detail views
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssignmentDetails {
    #[serde(flatten)]
    pub assignment: Assignment,
    pub asset_tag: String,
    pub asset_name: String,
    pub user_name: String,
    pub user_email: String,
    /// Computed at read time: still active and past expected_return_at
    pub is_overdue: bool,
}

/// Create assignment request. The optional location fields record where
/// the asset will live and are applied to the asset record on hand-over.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssignment {
    pub asset_id: i32,
    pub user_id: i32,
    pub purpose: Option<String>,
    pub expected_return_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    pub desk: Option<String>,
    pub location_notes: Option<String>,
}

/// Partial assignment update. Setting `status` to `returned` routes
/// through the return path and flips the asset back to available.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateAssignment {
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub expected_return_at: Option<DateTime<Utc>>,
    pub status: Option<AssignmentStatus>,
}

/// Return assignment request
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ReturnAssignment {
    pub returned_at: Option<DateTime<Utc>>,
    pub actual_return_condition: Option<AssetCondition>,
    pub return_notes: Option<String>,
}

/// Assignment list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AssignmentQuery {
    pub status: Option<AssignmentStatus>,
    pub user_id: Option<i32>,
    pub asset_id: Option<i32>,
    /// Only assignments past their expected return date
    pub overdue: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Operations accepted by the assignment bulk runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkAssignmentOperation {
    Return,
    StatusChange,
    ExtendReturnDate,
}

/// Payload for assignment bulk operations
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BulkAssignmentData {
    pub status: Option<AssignmentStatus>,
    pub expected_return_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub actual_return_condition: Option<AssetCondition>,
    pub return_notes: Option<String>,
}

/// Assignment bulk operation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAssignmentRequest {
    pub operation: BulkAssignmentOperation,
    pub assignment_ids: Vec<i32>,
    pub data: Option<BulkAssignmentData>,
}

/// Assignment bulk operation result; same dispatch-vs-items semantics
/// as the asset variant.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAssignmentResult {
    pub success: bool,
    pub total_assignments: usize,
    pub processed_assignments: usize,
    pub successful_assignments: usize,
    pub failed_assignments: usize,
    pub errors: Vec<BulkItemError>,
}

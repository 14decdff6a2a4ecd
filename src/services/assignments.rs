//! Assignment lifecycle service: the core state machine
//!
//! An assignment binds one asset to one user. Creation requires an
//! available asset, an active user, and headroom under the per-user cap;
//! it flips the asset to `assigned`. Return reverses the binding. Both
//! transitions are atomic at the repository layer.

use chrono::Utc;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::UpdateAsset,
        assignment::{
            Assignment, AssignmentDetails, AssignmentQuery, BulkAssignmentData,
            BulkAssignmentOperation, BulkAssignmentRequest, BulkAssignmentResult,
            CreateAssignment, ReturnAssignment, UpdateAssignment,
        },
        audit::NewAuditLog,
        enums::{AssetStatus, AssignmentStatus, AuditAction},
        user::UserClaims,
    },
    repository::Repository,
    services::{audit::changed_fields, tally_bulk, AuditService, InvalidationService},
};

/// Fixed cap on concurrently held assignments per user
pub const MAX_ACTIVE_PER_USER: i64 = 5;

const MAX_BULK_ASSIGNMENTS: usize = 50;

#[derive(Clone)]
pub struct AssignmentsService {
    repository: Repository,
    audit: AuditService,
    invalidation: InvalidationService,
}

impl AssignmentsService {
    pub fn new(
        repository: Repository,
        audit: AuditService,
        invalidation: InvalidationService,
    ) -> Self {
        Self {
            repository,
            audit,
            invalidation,
        }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<Assignment> {
        self.repository.assignments.get_by_id(id).await
    }

    pub async fn list(&self, query: &AssignmentQuery) -> AppResult<Vec<AssignmentDetails>> {
        self.repository.assignments.list(query).await
    }

    /// Active assignments held by a user
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<AssignmentDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;
        self.repository.assignments.list_for_user(user_id).await
    }

    /// Assign an available asset to an active user
    pub async fn create(
        &self,
        data: CreateAssignment,
        actor: &UserClaims,
    ) -> AppResult<Assignment> {
        actor.require_manager()?;

        let asset = self.repository.assets.get_by_id(data.asset_id).await?;
        if asset.status == AssetStatus::Assigned
            || self
                .repository
                .assignments
                .get_active_by_asset(data.asset_id)
                .await?
                .is_some()
        {
            return Err(AppError::conflict("asset_id", "Asset is already assigned"));
        }
        if asset.status != AssetStatus::Available {
            return Err(AppError::BusinessRule(format!(
                "Asset {} is not available (status: {})",
                asset.tag, asset.status
            )));
        }

        let user = self.repository.users.get_by_id(data.user_id).await?;
        if !user.is_active {
            return Err(AppError::BusinessRule(format!(
                "User {} is not active",
                user.email
            )));
        }

        let active = self
            .repository
            .assignments
            .count_active_for_user(data.user_id)
            .await?;
        if active >= MAX_ACTIVE_PER_USER {
            return Err(AppError::BusinessRule(format!(
                "User already holds the maximum of {} active assignments",
                MAX_ACTIVE_PER_USER
            )));
        }

        if let Some(expected) = data.expected_return_at {
            if expected <= Utc::now() {
                return Err(AppError::validation(
                    "expected_return_at",
                    "Expected return date must be in the future",
                ));
            }
        }

        let assignment = self
            .repository
            .assignments
            .create(
                data.asset_id,
                data.user_id,
                data.purpose.as_deref(),
                data.expected_return_at,
                data.notes.as_deref(),
                actor.user_id,
            )
            .await?;

        // Hand-over location, when given, is recorded on the asset itself.
        // The assignment is already committed at this point, so a failure
        // here is logged and must not fail the create.
        if data.building.is_some()
            || data.floor.is_some()
            || data.room.is_some()
            || data.desk.is_some()
            || data.location_notes.is_some()
        {
            let patch = UpdateAsset {
                building: data.building.clone(),
                floor: data.floor.clone(),
                room: data.room.clone(),
                desk: data.desk.clone(),
                location_notes: data.location_notes.clone(),
                ..UpdateAsset::default()
            };
            if let Err(e) = self.repository.assets.update(data.asset_id, &patch).await {
                tracing::warn!(
                    asset_id = data.asset_id,
                    "hand-over location update failed: {}",
                    e
                );
            }
        }

        self.audit
            .record(NewAuditLog {
                action: AuditAction::Assign,
                entity_type: "assignment".to_string(),
                entity_id: assignment.id,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: None,
                new_values: serde_json::to_value(&assignment).ok(),
                changed_fields: None,
                description: Some(format!(
                    "Assigned asset {} to {}",
                    asset.tag, user.email
                )),
            })
            .await;
        self.invalidate_views(assignment.asset_id).await;

        Ok(assignment)
    }

    /// Partial edit of an assignment. Setting status to `returned` routes
    /// through the return path so the asset side effect is preserved.
    pub async fn update(
        &self,
        id: i32,
        data: UpdateAssignment,
        actor: &UserClaims,
    ) -> AppResult<Assignment> {
        actor.require_manager()?;

        if data.status == Some(AssignmentStatus::Returned) {
            let patch = UpdateAssignment {
                status: None,
                ..data
            };
            if patch.purpose.is_some() || patch.notes.is_some() || patch.expected_return_at.is_some()
            {
                self.repository.assignments.update(id, &patch).await?;
            }
            return self
                .return_assignment(id, ReturnAssignment::default(), actor)
                .await;
        }

        let existing = self.repository.assignments.get_by_id(id).await?;
        let updated = self.repository.assignments.update(id, &data).await?;

        let old_snapshot = serde_json::to_value(&existing).ok();
        let new_snapshot = serde_json::to_value(&updated).ok();
        let diff = match (&old_snapshot, &new_snapshot) {
            (Some(old), Some(new)) => Some(changed_fields(old, new)),
            _ => None,
        };

        self.audit
            .record(NewAuditLog {
                action: AuditAction::Update,
                entity_type: "assignment".to_string(),
                entity_id: id,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: old_snapshot,
                new_values: new_snapshot,
                changed_fields: diff,
                description: Some(format!("Updated assignment {}", id)),
            })
            .await;
        self.invalidate_views(updated.asset_id).await;

        Ok(updated)
    }

    /// Return an assigned asset; the assignment closes and the asset
    /// becomes available again.
    pub async fn return_assignment(
        &self,
        id: i32,
        details: ReturnAssignment,
        actor: &UserClaims,
    ) -> AppResult<Assignment> {
        actor.require_manager()?;

        let returned_at = details.returned_at.unwrap_or_else(Utc::now);
        let assignment = self
            .repository
            .assignments
            .mark_returned(
                id,
                returned_at,
                details.actual_return_condition,
                details.return_notes.as_deref(),
                actor.user_id,
            )
            .await?;

        // Asset and user are loaded for the audit description only
        let description = match (
            self.repository.assets.get_by_id(assignment.asset_id).await,
            self.repository.users.get_by_id(assignment.user_id).await,
        ) {
            (Ok(asset), Ok(user)) => {
                format!("Returned asset {} from {}", asset.tag, user.email)
            }
            _ => format!("Returned assignment {}", id),
        };

        self.audit
            .record(NewAuditLog {
                action: AuditAction::Return,
                entity_type: "assignment".to_string(),
                entity_id: id,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: None,
                new_values: serde_json::to_value(&assignment).ok(),
                changed_fields: None,
                description: Some(description),
            })
            .await;
        self.invalidate_views(assignment.asset_id).await;

        Ok(assignment)
    }

    /// Apply one operation to a bounded list of assignments, continuing
    /// past per-item failures. All ids must resolve before anything runs.
    pub async fn bulk(
        &self,
        request: BulkAssignmentRequest,
        actor: &UserClaims,
    ) -> AppResult<BulkAssignmentResult> {
        actor.require_manager()?;

        let ids = &request.assignment_ids;
        if ids.is_empty() {
            return Err(AppError::validation(
                "assignment_ids",
                "No assignment ids provided",
            ));
        }
        if ids.len() > MAX_BULK_ASSIGNMENTS {
            return Err(AppError::validation(
                "assignment_ids",
                format!("At most {} assignments per bulk operation", MAX_BULK_ASSIGNMENTS),
            ));
        }

        let found = self.repository.assignments.existing_ids(ids).await?;
        let missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Assignments not found: {:?}",
                missing
            )));
        }

        let data = request.data.unwrap_or_default();
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push((
                id,
                self.apply_bulk_item(request.operation, id, &data, actor).await,
            ));
        }
        let (successful, errors) = tally_bulk(outcomes);

        self.audit
            .record(NewAuditLog {
                action: AuditAction::BulkOperation,
                entity_type: "assignment".to_string(),
                entity_id: 0,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: None,
                new_values: None,
                changed_fields: None,
                description: Some(format!(
                    "Bulk {:?} on {} assignments ({} ok, {} failed): {:?}",
                    request.operation,
                    ids.len(),
                    successful,
                    errors.len(),
                    ids
                )),
            })
            .await;
        self.invalidation.invalidate("/assignments").await;
        self.invalidation.invalidate("/assets").await;

        Ok(BulkAssignmentResult {
            success: true,
            total_assignments: ids.len(),
            processed_assignments: ids.len(),
            successful_assignments: successful,
            failed_assignments: errors.len(),
            errors,
        })
    }

    async fn apply_bulk_item(
        &self,
        operation: BulkAssignmentOperation,
        id: i32,
        data: &BulkAssignmentData,
        actor: &UserClaims,
    ) -> AppResult<()> {
        match operation {
            BulkAssignmentOperation::Return => {
                self.repository
                    .assignments
                    .mark_returned(
                        id,
                        data.returned_at.unwrap_or_else(Utc::now),
                        data.actual_return_condition,
                        data.return_notes.as_deref(),
                        actor.user_id,
                    )
                    .await?;
            }
            BulkAssignmentOperation::StatusChange => {
                let status = data.status.ok_or_else(|| {
                    AppError::validation("status", "status is required for status_change")
                })?;
                if status == AssignmentStatus::Returned {
                    self.repository
                        .assignments
                        .mark_returned(
                            id,
                            data.returned_at.unwrap_or_else(Utc::now),
                            data.actual_return_condition,
                            data.return_notes.as_deref(),
                            actor.user_id,
                        )
                        .await?;
                } else {
                    let patch = UpdateAssignment {
                        status: Some(status),
                        ..UpdateAssignment::default()
                    };
                    self.repository.assignments.update(id, &patch).await?;
                }
            }
            BulkAssignmentOperation::ExtendReturnDate => {
                let expected = data.expected_return_at.ok_or_else(|| {
                    AppError::validation(
                        "expected_return_at",
                        "expected_return_at is required for extend_return_date",
                    )
                })?;
                if expected <= Utc::now() {
                    return Err(AppError::validation(
                        "expected_return_at",
                        "Expected return date must be in the future",
                    ));
                }
                self.repository
                    .assignments
                    .extend_return_date(id, expected)
                    .await?;
            }
        }
        Ok(())
    }

    async fn invalidate_views(&self, asset_id: i32) {
        self.invalidation.invalidate("/assignments").await;
        self.invalidation.invalidate("/assets").await;
        self.invalidation
            .invalidate(&format!("/assets/{}", asset_id))
            .await;
    }
}

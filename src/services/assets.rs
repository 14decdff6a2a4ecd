//! Asset lifecycle service: create, update, soft-delete, bulk operations
//!
//! Enforces tag format and uniqueness, the delete guard for assigned
//! assets, and writes the audit trail for every state change.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{
            Asset, AssetListResponse, AssetQuery, BulkAssetData, BulkAssetOperation,
            BulkAssetRequest, BulkAssetResult, CreateAsset, UpdateAsset,
        },
        audit::NewAuditLog,
        enums::{AssetCondition, AuditAction},
        user::UserClaims,
    },
    repository::Repository,
    services::{audit::changed_fields, map_validation, tally_bulk, AuditService, InvalidationService},
};

/// Strict tag format: IT-<2-3 letter category code>-<4 digits>
static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^IT-[A-Z]{2,3}-[0-9]{4}$").expect("invalid tag regex"));

const MAX_BULK_ASSETS: usize = 100;
const TAG_GENERATION_ATTEMPTS: u32 = 10;

/// Uppercase and trim a user-supplied tag
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_uppercase()
}

/// Whether a normalized tag matches the required format
pub fn is_valid_tag(tag: &str) -> bool {
    TAG_RE.is_match(tag)
}

/// One generation candidate for a category code and a 4-digit suffix
fn tag_candidate(code: &str, suffix: u32) -> String {
    format!("IT-{}-{:04}", code, suffix % 10_000)
}

#[derive(Clone)]
pub struct AssetsService {
    repository: Repository,
    audit: AuditService,
    invalidation: InvalidationService,
}

impl AssetsService {
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

    pub async fn get_by_id(&self, id: i32) -> AppResult<Asset> {
        self.repository.assets.get_by_id(id).await
    }

    pub async fn list(&self, query: &AssetQuery) -> AppResult<AssetListResponse> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);
        let (assets, total) = self.repository.assets.list(query).await?;
        Ok(AssetListResponse {
            assets,
            total,
            page,
            per_page,
        })
    }

    /// Register a new asset. Status defaults to available, condition to
    /// good; the tag is generated from the category when absent.
    pub async fn create(&self, data: CreateAsset, actor: &UserClaims) -> AppResult<Asset> {
        actor.require_manager()?;
        data.validate().map_err(map_validation)?;

        let tag = match data.tag.as_deref() {
            Some(raw) => {
                let tag = normalize_tag(raw);
                if !is_valid_tag(&tag) {
                    return Err(AppError::validation(
                        "tag",
                        "Tag must match IT-<2-3 letters>-<4 digits>",
                    ));
                }
                if self.repository.assets.find_live_by_tag(&tag, None).await?.is_some() {
                    return Err(AppError::conflict(
                        "tag",
                        format!("An asset with tag {} already exists", tag),
                    ));
                }
                tag
            }
            None => self.generate_tag(&data).await?,
        };

        let condition = data.condition.unwrap_or(AssetCondition::Good);
        let asset = self
            .repository
            .assets
            .insert(&data, &tag, condition, actor.user_id)
            .await?;

        self.audit
            .record(NewAuditLog {
                action: AuditAction::Create,
                entity_type: "asset".to_string(),
                entity_id: asset.id,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: None,
                new_values: serde_json::to_value(&asset).ok(),
                changed_fields: None,
                description: Some(format!("Created asset {} ({})", asset.tag, asset.name)),
            })
            .await;
        self.invalidation.invalidate("/assets").await;

        Ok(asset)
    }

    /// Partial edit. A changed tag is re-validated against all other
    /// non-deleted assets.
    pub async fn update(
        &self,
        id: i32,
        mut data: UpdateAsset,
        actor: &UserClaims,
    ) -> AppResult<Asset> {
        actor.require_manager()?;
        data.validate().map_err(map_validation)?;

        let existing = self.repository.assets.get_by_id(id).await?;

        if let Some(raw) = data.tag.as_deref() {
            let tag = normalize_tag(raw);
            if !is_valid_tag(&tag) {
                return Err(AppError::validation(
                    "tag",
                    "Tag must match IT-<2-3 letters>-<4 digits>",
                ));
            }
            if self
                .repository
                .assets
                .find_live_by_tag(&tag, Some(id))
                .await?
                .is_some()
            {
                return Err(AppError::conflict(
                    "tag",
                    format!("An asset with tag {} already exists", tag),
                ));
            }
            data.tag = Some(tag);
        }

        let updated = self.repository.assets.update(id, &data).await?;

        let old_snapshot = serde_json::to_value(&existing).ok();
        let new_snapshot = serde_json::to_value(&updated).ok();
        let diff = match (&old_snapshot, &new_snapshot) {
            (Some(old), Some(new)) => Some(changed_fields(old, new)),
            _ => None,
        };

        self.audit
            .record(NewAuditLog {
                action: AuditAction::Update,
                entity_type: "asset".to_string(),
                entity_id: id,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: old_snapshot,
                new_values: new_snapshot,
                changed_fields: diff,
                description: Some(format!("Updated asset {}", updated.tag)),
            })
            .await;
        self.invalidation.invalidate("/assets").await;
        self.invalidation.invalidate(&format!("/assets/{}", id)).await;

        Ok(updated)
    }

    /// Soft-delete an asset. Admin tier; refused while an active
    /// assignment references the asset.
    pub async fn soft_delete(&self, id: i32, actor: &UserClaims) -> AppResult<()> {
        actor.require_admin()?;

        let existing = self.repository.assets.get_by_id(id).await?;
        self.delete_one(id).await?;

        self.audit
            .record(NewAuditLog {
                action: AuditAction::Delete,
                entity_type: "asset".to_string(),
                entity_id: id,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: serde_json::to_value(&existing).ok(),
                new_values: None,
                changed_fields: None,
                description: Some(format!("Deleted asset {} ({})", existing.tag, existing.name)),
            })
            .await;
        self.invalidation.invalidate("/assets").await;

        Ok(())
    }

    /// Apply one operation to a bounded list of assets, continuing past
    /// per-item failures. All ids must resolve to non-deleted assets
    /// before anything is processed.
    pub async fn bulk(
        &self,
        request: BulkAssetRequest,
        actor: &UserClaims,
    ) -> AppResult<BulkAssetResult> {
        actor.require_manager()?;
        if request.operation == BulkAssetOperation::Delete {
            actor.require_admin()?;
        }

        let ids = &request.asset_ids;
        if ids.is_empty() {
            return Err(AppError::validation("asset_ids", "No asset ids provided"));
        }
        if ids.len() > MAX_BULK_ASSETS {
            return Err(AppError::validation(
                "asset_ids",
                format!("At most {} assets per bulk operation", MAX_BULK_ASSETS),
            ));
        }

        let found = self.repository.assets.live_ids(ids).await?;
        let missing: Vec<i32> = ids.iter().copied().filter(|id| !found.contains(id)).collect();
        if !missing.is_empty() {
            return Err(AppError::BadRequest(format!(
                "Assets not found: {:?}",
                missing
            )));
        }

        let data = request.data.unwrap_or_default();
        let mut outcomes = Vec::with_capacity(ids.len());
        for &id in ids {
            outcomes.push((id, self.apply_bulk_item(request.operation, id, &data).await));
        }
        let (successful, errors) = tally_bulk(outcomes);

        // One summary entry for the whole run, not one per item
        self.audit
            .record(NewAuditLog {
                action: AuditAction::BulkOperation,
                entity_type: "asset".to_string(),
                entity_id: 0,
                actor_id: Some(actor.user_id),
                actor_email: Some(actor.sub.clone()),
                old_values: None,
                new_values: None,
                changed_fields: None,
                description: Some(format!(
                    "Bulk {:?} on {} assets ({} ok, {} failed): {:?}",
                    request.operation,
                    ids.len(),
                    successful,
                    errors.len(),
                    ids
                )),
            })
            .await;
        self.invalidation.invalidate("/assets").await;

        Ok(BulkAssetResult {
            success: true,
            total_assets: ids.len(),
            processed_assets: ids.len(),
            successful_assets: successful,
            failed_assets: errors.len(),
            errors,
        })
    }

    async fn apply_bulk_item(
        &self,
        operation: BulkAssetOperation,
        id: i32,
        data: &BulkAssetData,
    ) -> AppResult<()> {
        match operation {
            BulkAssetOperation::Update => {
                let patch = UpdateAsset {
                    name: data.name.clone(),
                    condition: data.condition,
                    notes: data.notes.clone(),
                    ..UpdateAsset::default()
                };
                self.repository.assets.update(id, &patch).await?;
            }
            BulkAssetOperation::Delete => {
                self.delete_one(id).await?;
            }
            BulkAssetOperation::StatusChange => {
                let status = data.status.ok_or_else(|| {
                    AppError::validation("status", "status is required for status_change")
                })?;
                self.repository.assets.set_status(id, status).await?;
            }
            BulkAssetOperation::CategoryChange => {
                let category = data.category.ok_or_else(|| {
                    AppError::validation("category", "category is required for category_change")
                })?;
                let patch = UpdateAsset {
                    category: Some(category),
                    ..UpdateAsset::default()
                };
                self.repository.assets.update(id, &patch).await?;
            }
            BulkAssetOperation::LocationChange => {
                let patch = UpdateAsset {
                    building: data.building.clone(),
                    floor: data.floor.clone(),
                    room: data.room.clone(),
                    desk: data.desk.clone(),
                    location_notes: data.location_notes.clone(),
                    ..UpdateAsset::default()
                };
                self.repository.assets.update(id, &patch).await?;
            }
        }
        Ok(())
    }

    /// Delete guard shared by the single and bulk paths
    async fn delete_one(&self, id: i32) -> AppResult<()> {
        if self
            .repository
            .assignments
            .get_active_by_asset(id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict {
                field: None,
                message: "Asset has an active assignment and must be returned first".to_string(),
            });
        }
        self.repository.assets.soft_delete(id).await
    }

    /// Allocate a tag of the form IT-<category code>-NNNN not held by any
    /// non-deleted asset.
    async fn generate_tag(&self, data: &CreateAsset) -> AppResult<String> {
        let code = data.category.tag_code();
        for _ in 0..TAG_GENERATION_ATTEMPTS {
            let suffix = rand::thread_rng().gen_range(0..10_000);
            let tag = tag_candidate(code, suffix);
            if self.repository.assets.find_live_by_tag(&tag, None).await?.is_none() {
                return Ok(tag);
            }
        }
        Err(AppError::Internal(format!(
            "Could not allocate a unique tag for category {}",
            data.category
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::AssetCategory;

    #[test]
    fn tags_are_normalized_to_uppercase() {
        assert_eq!(normalize_tag("  it-lt-0042 "), "IT-LT-0042");
    }

    #[test]
    fn valid_tags_match_the_strict_format() {
        assert!(is_valid_tag("IT-LT-0001"));
        assert!(is_valid_tag("IT-SRV-9999"));
        assert!(!is_valid_tag("IT-L-0001"));
        assert!(!is_valid_tag("IT-LXYZ-0001"));
        assert!(!is_valid_tag("IT-LT-001"));
        assert!(!is_valid_tag("IT-LT-00012"));
        assert!(!is_valid_tag("AST-1700000000"));
        assert!(!is_valid_tag("it-lt-0001"));
    }

    #[test]
    fn generated_candidates_match_the_format() {
        for category in [
            AssetCategory::Laptop,
            AssetCategory::Server,
            AssetCategory::NetworkDevice,
        ] {
            for suffix in [0, 7, 9999, 123456] {
                let tag = tag_candidate(category.tag_code(), suffix);
                assert!(is_valid_tag(&tag), "bad candidate: {}", tag);
            }
        }
    }
}

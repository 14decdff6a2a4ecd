//! Asset model and related request types

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::enums::{AssetCategory, AssetCondition, AssetStatus};

/// Asset record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Asset {
    pub id: i32,
    /// Unique tag among non-deleted assets (IT-<code>-NNNN)
    pub tag: String,
    pub name: String,
    pub category: AssetCategory,
    pub subcategory: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub status: AssetStatus,
    pub condition: AssetCondition,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub depreciation_rate: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    pub desk: Option<String>,
    pub location_notes: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub is_deleted: bool,
    pub created_by: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create asset request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAsset {
    /// Tag; generated from the category when absent
    pub tag: Option<String>,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub category: AssetCategory,
    pub subcategory: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub condition: Option<AssetCondition>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub depreciation_rate: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    pub desk: Option<String>,
    pub location_notes: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Update asset request; absent fields retain their current value
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAsset {
    pub tag: Option<String>,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    pub category: Option<AssetCategory>,
    pub subcategory: Option<String>,
    pub serial_number: Option<String>,
    pub model: Option<String>,
    pub manufacturer: Option<String>,
    pub status: Option<AssetStatus>,
    pub condition: Option<AssetCondition>,
    pub purchase_date: Option<NaiveDate>,
    pub purchase_price: Option<Decimal>,
    pub current_value: Option<Decimal>,
    pub depreciation_rate: Option<Decimal>,
    pub warranty_expiry: Option<NaiveDate>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    pub desk: Option<String>,
    pub location_notes: Option<String>,
    pub description: Option<String>,
    pub notes: Option<String>,
}

/// Asset list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AssetQuery {
    /// Free-text search over tag, name, serial number
    pub search: Option<String>,
    pub status: Option<AssetStatus>,
    pub category: Option<AssetCategory>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Paged asset list response
#[derive(Debug, Serialize, ToSchema)]
pub struct AssetListResponse {
    pub assets: Vec<Asset>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Operations accepted by the asset bulk runner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BulkAssetOperation {
    Update,
    Delete,
    StatusChange,
    CategoryChange,
    LocationChange,
}

/// Payload for asset bulk operations; which fields are required depends
/// on the operation.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct BulkAssetData {
    pub name: Option<String>,
    pub status: Option<AssetStatus>,
    pub category: Option<AssetCategory>,
    pub condition: Option<AssetCondition>,
    pub notes: Option<String>,
    pub building: Option<String>,
    pub floor: Option<String>,
    pub room: Option<String>,
    pub desk: Option<String>,
    pub location_notes: Option<String>,
}

/// Asset bulk operation request
#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAssetRequest {
    pub operation: BulkAssetOperation,
    pub asset_ids: Vec<i32>,
    pub data: Option<BulkAssetData>,
}

/// Per-item failure inside a bulk operation
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BulkItemError {
    pub id: i32,
    pub error: String,
}

/// Asset bulk operation result. `success` reflects whether the dispatch
/// itself ran; callers inspect `failed_assets`/`errors` for per-item outcome.
#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAssetResult {
    pub success: bool,
    pub total_assets: usize,
    pub processed_assets: usize,
    pub successful_assets: usize,
    pub failed_assets: usize,
    pub errors: Vec<BulkItemError>,
}

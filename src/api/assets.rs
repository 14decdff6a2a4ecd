//! Asset management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::asset::{
        Asset, AssetListResponse, AssetQuery, BulkAssetRequest, BulkAssetResult, CreateAsset,
        UpdateAsset,
    },
};

use super::AuthenticatedUser;

/// List assets with filters and paging
#[utoipa::path(
    get,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(AssetQuery),
    responses(
        (status = 200, description = "Asset list", body = AssetListResponse)
    )
)]
pub async fn list_assets(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<AssetQuery>,
) -> AppResult<Json<AssetListResponse>> {
    let response = state.services.assets.list(&query).await?;
    Ok(Json(response))
}

/// Get asset by ID
#[utoipa::path(
    get,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 200, description = "Asset details", body = Asset),
        (status = 404, description = "Asset not found")
    )
)]
pub async fn get_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.assets.get_by_id(id).await?;
    Ok(Json(asset))
}

/// Register a new asset
#[utoipa::path(
    post,
    path = "/assets",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = CreateAsset,
    responses(
        (status = 201, description = "Asset created", body = Asset),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Insufficient permissions"),
        (status = 409, description = "Tag already in use")
    )
)]
pub async fn create_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(data): Json<CreateAsset>,
) -> AppResult<(StatusCode, Json<Asset>)> {
    let asset = state.services.assets.create(data, &claims).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// Update an asset
#[utoipa::path(
    put,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    request_body = UpdateAsset,
    responses(
        (status = 200, description = "Asset updated", body = Asset),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Tag already in use")
    )
)]
pub async fn update_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(data): Json<UpdateAsset>,
) -> AppResult<Json<Asset>> {
    let asset = state.services.assets.update(id, data, &claims).await?;
    Ok(Json(asset))
}

/// Soft-delete an asset (admin tier)
#[utoipa::path(
    delete,
    path = "/assets/{id}",
    tag = "assets",
    security(("bearer_auth" = [])),
    params(("id" = i32, Path, description = "Asset ID")),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 404, description = "Asset not found"),
        (status = 409, description = "Asset has an active assignment")
    )
)]
pub async fn delete_asset(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<StatusCode> {
    state.services.assets.soft_delete(id, &claims).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run one operation over up to 100 assets, continuing past per-item failures
#[utoipa::path(
    post,
    path = "/assets/bulk",
    tag = "assets",
    security(("bearer_auth" = [])),
    request_body = BulkAssetRequest,
    responses(
        (status = 200, description = "Bulk result with per-item outcome", body = BulkAssetResult),
        (status = 400, description = "Unknown ids or too many items")
    )
)]
pub async fn bulk_asset_operations(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<BulkAssetRequest>,
) -> AppResult<Json<BulkAssetResult>> {
    let result = state.services.assets.bulk(request, &claims).await?;
    Ok(Json(result))
}

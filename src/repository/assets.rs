//! Assets repository for database operations

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        asset::{Asset, AssetQuery, CreateAsset, UpdateAsset},
        enums::{AssetCondition, AssetStatus},
    },
};

#[derive(Clone)]
pub struct AssetsRepository {
    pool: Pool<Postgres>,
}

impl AssetsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get a non-deleted asset by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>("SELECT * FROM assets WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    /// Find a non-deleted asset holding the given tag (case-insensitive),
    /// optionally excluding one id (for tag-change validation on update).
    pub async fn find_live_by_tag(
        &self,
        tag: &str,
        exclude_id: Option<i32>,
    ) -> AppResult<Option<Asset>> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            SELECT * FROM assets
            WHERE UPPER(tag) = UPPER($1) AND NOT is_deleted
              AND ($2::int4 IS NULL OR id != $2)
            "#,
        )
        .bind(tag)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(asset)
    }

    /// Insert a new asset. Tag and condition are resolved by the service.
    pub async fn insert(
        &self,
        data: &CreateAsset,
        tag: &str,
        condition: AssetCondition,
        created_by: i32,
    ) -> AppResult<Asset> {
        let asset = sqlx::query_as::<_, Asset>(
            r#"
            INSERT INTO assets (
                tag, name, category, subcategory, serial_number, model,
                manufacturer, status, condition, purchase_date, purchase_price,
                current_value, depreciation_rate, warranty_expiry,
                building, floor, room, desk, location_notes,
                description, notes, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING *
            "#,
        )
        .bind(tag)
        .bind(&data.name)
        .bind(data.category)
        .bind(&data.subcategory)
        .bind(&data.serial_number)
        .bind(&data.model)
        .bind(&data.manufacturer)
        .bind(AssetStatus::Available)
        .bind(condition)
        .bind(data.purchase_date)
        .bind(data.purchase_price)
        .bind(data.current_value)
        .bind(data.depreciation_rate)
        .bind(data.warranty_expiry)
        .bind(&data.building)
        .bind(&data.floor)
        .bind(&data.room)
        .bind(&data.desk)
        .bind(&data.location_notes)
        .bind(&data.description)
        .bind(&data.notes)
        .bind(created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(map_tag_violation)?;
        Ok(asset)
    }

    /// Partial update; provided fields overwrite, absent fields are kept.
    /// Tag normalization and uniqueness checks happen in the service.
    pub async fn update(&self, id: i32, data: &UpdateAsset) -> AppResult<Asset> {
        let now = Utc::now();
        let mut sets = vec!["updated_at = $1".to_string()];
        let mut idx = 2;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, idx));
                    idx += 1;
                }
            };
        }

        add_field!(data.tag, "tag");
        add_field!(data.name, "name");
        add_field!(data.category, "category");
        add_field!(data.subcategory, "subcategory");
        add_field!(data.serial_number, "serial_number");
        add_field!(data.model, "model");
        add_field!(data.manufacturer, "manufacturer");
        add_field!(data.status, "status");
        add_field!(data.condition, "condition");
        add_field!(data.purchase_date, "purchase_date");
        add_field!(data.purchase_price, "purchase_price");
        add_field!(data.current_value, "current_value");
        add_field!(data.depreciation_rate, "depreciation_rate");
        add_field!(data.warranty_expiry, "warranty_expiry");
        add_field!(data.building, "building");
        add_field!(data.floor, "floor");
        add_field!(data.room, "room");
        add_field!(data.desk, "desk");
        add_field!(data.location_notes, "location_notes");
        add_field!(data.description, "description");
        add_field!(data.notes, "notes");

        let query = format!(
            "UPDATE assets SET {} WHERE id = ${} AND NOT is_deleted RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Asset>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.tag);
        bind_field!(data.name);
        bind_field!(data.category);
        bind_field!(data.subcategory);
        bind_field!(data.serial_number);
        bind_field!(data.model);
        bind_field!(data.manufacturer);
        bind_field!(data.status);
        bind_field!(data.condition);
        bind_field!(data.purchase_date);
        bind_field!(data.purchase_price);
        bind_field!(data.current_value);
        bind_field!(data.depreciation_rate);
        bind_field!(data.warranty_expiry);
        bind_field!(data.building);
        bind_field!(data.floor);
        bind_field!(data.room);
        bind_field!(data.desk);
        bind_field!(data.location_notes);
        bind_field!(data.description);
        bind_field!(data.notes);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_tag_violation)?
            .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    /// Change the availability status of an asset
    pub async fn set_status(&self, id: i32, status: AssetStatus) -> AppResult<Asset> {
        sqlx::query_as::<_, Asset>(
            "UPDATE assets SET status = $1, updated_at = $2 WHERE id = $3 AND NOT is_deleted RETURNING *",
        )
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Asset with id {} not found", id)))
    }

    /// Flag an asset as deleted; the row is never physically removed
    pub async fn soft_delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE assets SET is_deleted = TRUE, updated_at = $1 WHERE id = $2 AND NOT is_deleted",
        )
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Asset with id {} not found", id)));
        }
        Ok(())
    }

    /// List non-deleted assets with filters and paging
    pub async fn list(&self, query: &AssetQuery) -> AppResult<(Vec<Asset>, i64)> {
        let mut conditions = vec!["NOT is_deleted".to_string()];
        let mut idx = 1;

        if query.search.is_some() {
            conditions.push(format!(
                "(tag ILIKE ${i} OR name ILIKE ${i} OR serial_number ILIKE ${i})",
                i = idx
            ));
            idx += 1;
        }
        if query.status.is_some() {
            conditions.push(format!("status = ${}", idx));
            idx += 1;
        }
        if query.category.is_some() {
            conditions.push(format!("category = ${}", idx));
            idx += 1;
        }

        let where_clause = conditions.join(" AND ");
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let search_pattern = query.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM assets WHERE {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref p) = search_pattern {
            count_query = count_query.bind(p);
        }
        if let Some(s) = query.status {
            count_query = count_query.bind(s);
        }
        if let Some(c) = query.category {
            count_query = count_query.bind(c);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM assets WHERE {} ORDER BY tag LIMIT ${} OFFSET ${}",
            where_clause,
            idx,
            idx + 1
        );
        let mut list_query = sqlx::query_as::<_, Asset>(&list_sql);
        if let Some(ref p) = search_pattern {
            list_query = list_query.bind(p);
        }
        if let Some(s) = query.status {
            list_query = list_query.bind(s);
        }
        if let Some(c) = query.category {
            list_query = list_query.bind(c);
        }
        let assets = list_query
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        Ok((assets, total))
    }

    /// All non-deleted assets, for the CSV export
    pub async fn list_all_live(&self) -> AppResult<Vec<Asset>> {
        let assets = sqlx::query_as::<_, Asset>(
            "SELECT * FROM assets WHERE NOT is_deleted ORDER BY tag",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(assets)
    }

    /// Which of the given ids resolve to non-deleted assets
    pub async fn live_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let found: Vec<i32> = sqlx::query_scalar(
            "SELECT id FROM assets WHERE id = ANY($1) AND NOT is_deleted",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;
        Ok(found)
    }

    /// Count non-deleted assets grouped by status (for stats)
    pub async fn count_by_status(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT status, COUNT(*) as value FROM assets WHERE NOT is_deleted GROUP BY status ORDER BY value DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get("status"), row.get("value")))
            .collect())
    }

    /// Count non-deleted assets grouped by category (for stats)
    pub async fn count_by_category(&self) -> AppResult<Vec<(String, i64)>> {
        let rows = sqlx::query(
            "SELECT category, COUNT(*) as value FROM assets WHERE NOT is_deleted GROUP BY category ORDER BY value DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.get("category"), row.get("value")))
            .collect())
    }

    /// Total current value of the non-deleted inventory (for stats)
    pub async fn total_current_value(&self) -> AppResult<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(current_value), 0) FROM assets WHERE NOT is_deleted",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }
}

/// Map a violation of the live-tag unique index to a structured conflict.
/// Backstop for the uniqueness pre-check in the service.
fn map_tag_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.constraint() == Some("assets_live_tag_key") {
            return AppError::conflict("tag", "An asset with this tag already exists");
        }
    }
    AppError::Database(e)
}

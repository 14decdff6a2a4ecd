//! Assignments repository for database operations
//!
//! Assignment create and return are two-row transitions (assignment row +
//! asset status). Both run inside a single transaction so a partial write
//! can never leave an assigned asset marked available or vice versa.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        assignment::{Assignment, AssignmentDetails, AssignmentQuery, UpdateAssignment},
        enums::{AssetCondition, AssetStatus, AssignmentStatus},
    },
};

#[derive(Clone)]
pub struct AssignmentsRepository {
    pool: Pool<Postgres>,
}

impl AssignmentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get assignment by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>("SELECT * FROM assignments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))
    }

    /// The active assignment for an asset, if any
    pub async fn get_active_by_asset(&self, asset_id: i32) -> AppResult<Option<Assignment>> {
        let assignment = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE asset_id = $1 AND is_active",
        )
        .bind(asset_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(assignment)
    }

    /// Number of active assignments held by a user
    pub async fn count_active_for_user(&self, user_id: i32) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignments WHERE user_id = $1 AND is_active",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Create an assignment and flip the asset to `assigned`, atomically.
    /// A concurrent create for the same asset loses on the partial unique
    /// index and surfaces as a conflict.
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        asset_id: i32,
        user_id: i32,
        purpose: Option<&str>,
        expected_return_at: Option<DateTime<Utc>>,
        notes: Option<&str>,
        assigned_by: i32,
    ) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO assignments (asset_id, user_id, status, assigned_at,
                                     expected_return_at, purpose, notes,
                                     assigned_by, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING *
            "#,
        )
        .bind(asset_id)
        .bind(user_id)
        .bind(AssignmentStatus::Active)
        .bind(Utc::now())
        .bind(expected_return_at)
        .bind(purpose)
        .bind(notes)
        .bind(assigned_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_active_violation)?;

        sqlx::query("UPDATE assets SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(AssetStatus::Assigned)
            .bind(Utc::now())
            .bind(asset_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// Close an assignment and flip the asset back to `available`, atomically
    pub async fn mark_returned(
        &self,
        id: i32,
        returned_at: DateTime<Utc>,
        actual_return_condition: Option<AssetCondition>,
        return_notes: Option<&str>,
        returned_by: i32,
    ) -> AppResult<Assignment> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Assignment>(
            "SELECT * FROM assignments WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))?;

        if !current.is_active {
            return Err(AppError::BusinessRule(
                "Assignment is not active".to_string(),
            ));
        }

        let assignment = sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments
            SET status = $1, returned_at = $2, actual_return_condition = $3,
                return_notes = $4, returned_by = $5, is_active = FALSE,
                updated_at = $6
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(AssignmentStatus::Returned)
        .bind(returned_at)
        .bind(actual_return_condition)
        .bind(return_notes)
        .bind(returned_by)
        .bind(Utc::now())
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE assets SET status = $1, updated_at = $2 WHERE id = $3")
            .bind(AssetStatus::Available)
            .bind(Utc::now())
            .bind(current.asset_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(assignment)
    }

    /// Partial edit of purpose/notes/expected_return_at/status.
    /// Returning an assignment is handled by `mark_returned`, never here.
    pub async fn update(&self, id: i32, data: &UpdateAssignment) -> AppResult<Assignment> {
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

        add_field!(data.purpose, "purpose");
        add_field!(data.notes, "notes");
        add_field!(data.expected_return_at, "expected_return_at");
        add_field!(data.status, "status");

        let query = format!(
            "UPDATE assignments SET {} WHERE id = ${} RETURNING *",
            sets.join(", "),
            idx
        );

        let mut builder = sqlx::query_as::<_, Assignment>(&query).bind(now);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(data.purpose);
        bind_field!(data.notes);
        bind_field!(data.expected_return_at);
        bind_field!(data.status);

        builder
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Assignment with id {} not found", id)))
    }

    /// Push out the expected return date of an active assignment
    pub async fn extend_return_date(
        &self,
        id: i32,
        expected_return_at: DateTime<Utc>,
    ) -> AppResult<Assignment> {
        sqlx::query_as::<_, Assignment>(
            r#"
            UPDATE assignments SET expected_return_at = $1, updated_at = $2
            WHERE id = $3 AND is_active
            RETURNING *
            "#,
        )
        .bind(expected_return_at)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            AppError::BusinessRule(format!("Assignment {} is not active", id))
        })
    }

    /// List assignments with asset/user context
    pub async fn list(&self, query: &AssignmentQuery) -> AppResult<Vec<AssignmentDetails>> {
        let mut conditions = vec!["TRUE".to_string()];
        let mut idx = 1;

        if query.status.is_some() {
            conditions.push(format!("a.status = ${}", idx));
            idx += 1;
        }
        if query.user_id.is_some() {
            conditions.push(format!("a.user_id = ${}", idx));
            idx += 1;
        }
        if query.asset_id.is_some() {
            conditions.push(format!("a.asset_id = ${}", idx));
            idx += 1;
        }
        if query.overdue == Some(true) {
            conditions.push(
                "a.is_active AND a.expected_return_at IS NOT NULL AND a.expected_return_at < NOW()"
                    .to_string(),
            );
        }

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let sql = format!(
            r#"
            SELECT a.*, s.tag as asset_tag, s.name as asset_name,
                   u.name as user_name, u.email as user_email
            FROM assignments a
            JOIN assets s ON a.asset_id = s.id
            JOIN users u ON a.user_id = u.id
            WHERE {}
            ORDER BY a.assigned_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            conditions.join(" AND "),
            idx,
            idx + 1
        );

        let mut q = sqlx::query(&sql);
        if let Some(s) = query.status {
            q = q.bind(s);
        }
        if let Some(u) = query.user_id {
            q = q.bind(u);
        }
        if let Some(a) = query.asset_id {
            q = q.bind(a);
        }
        let rows = q
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        let now = Utc::now();
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(details_from_row(&row, now)?);
        }
        Ok(result)
    }

    /// Active assignments held by a user, with asset context
    pub async fn list_for_user(&self, user_id: i32) -> AppResult<Vec<AssignmentDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT a.*, s.tag as asset_tag, s.name as asset_name,
                   u.name as user_name, u.email as user_email
            FROM assignments a
            JOIN assets s ON a.asset_id = s.id
            JOIN users u ON a.user_id = u.id
            WHERE a.user_id = $1 AND a.is_active
            ORDER BY a.assigned_at
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(details_from_row(&row, now)?);
        }
        Ok(result)
    }

    /// All assignments, for the CSV export
    pub async fn list_all(&self) -> AppResult<Vec<AssignmentDetails>> {
        let rows = sqlx::query(
            r#"
            SELECT a.*, s.tag as asset_tag, s.name as asset_name,
                   u.name as user_name, u.email as user_email
            FROM assignments a
            JOIN assets s ON a.asset_id = s.id
            JOIN users u ON a.user_id = u.id
            ORDER BY a.assigned_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let now = Utc::now();
        let mut result = Vec::with_capacity(rows.len());
        for row in rows {
            result.push(details_from_row(&row, now)?);
        }
        Ok(result)
    }

    /// Which of the given ids resolve to assignments
    pub async fn existing_ids(&self, ids: &[i32]) -> AppResult<Vec<i32>> {
        let found: Vec<i32> = sqlx::query_scalar("SELECT id FROM assignments WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(found)
    }

    /// Count active assignments
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM assignments WHERE is_active")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count active assignments past their expected return date
    pub async fn count_overdue(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM assignments WHERE is_active AND expected_return_at IS NOT NULL AND expected_return_at < NOW()",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

fn details_from_row(
    row: &sqlx::postgres::PgRow,
    now: DateTime<Utc>,
) -> AppResult<AssignmentDetails> {
    use sqlx::FromRow;

    let assignment = Assignment::from_row(row)?;
    let is_overdue = assignment.is_active
        && assignment
            .expected_return_at
            .map(|d| d < now)
            .unwrap_or(false);

    Ok(AssignmentDetails {
        asset_tag: row.get("asset_tag"),
        asset_name: row.get("asset_name"),
        user_name: row.get("user_name"),
        user_email: row.get("user_email"),
        is_overdue,
        assignment,
    })
}

/// Map a violation of the one-active-assignment index to a conflict.
/// This is what closes the check-then-act race between concurrent creates.
fn map_active_violation(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db) = e {
        if db.constraint() == Some("assignments_one_active_per_asset") {
            return AppError::conflict("asset_id", "Asset is already assigned");
        }
    }
    AppError::Database(e)
}

//! Audit log repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::audit::{AuditLog, AuditLogQuery, NewAuditLog},
};

#[derive(Clone)]
pub struct AuditRepository {
    pool: Pool<Postgres>,
}

impl AuditRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Append one audit entry. Callers decide whether a failure here is
    /// fatal; the audit service swallows it.
    pub async fn insert(&self, entry: &NewAuditLog) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (action, entity_type, entity_id, actor_id,
                                    actor_email, old_values, new_values,
                                    changed_fields, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(entry.action)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(&entry.old_values)
        .bind(&entry.new_values)
        .bind(&entry.changed_fields)
        .bind(&entry.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// List audit entries, newest first
    pub async fn list(&self, query: &AuditLogQuery) -> AppResult<Vec<AuditLog>> {
        let mut conditions = vec!["TRUE".to_string()];
        let mut idx = 1;

        if query.entity_type.is_some() {
            conditions.push(format!("entity_type = ${}", idx));
            idx += 1;
        }
        if query.entity_id.is_some() {
            conditions.push(format!("entity_id = ${}", idx));
            idx += 1;
        }
        if query.action.is_some() {
            conditions.push(format!("action = ${}", idx));
            idx += 1;
        }

        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let sql = format!(
            "SELECT * FROM audit_logs WHERE {} ORDER BY created_at DESC LIMIT ${} OFFSET ${}",
            conditions.join(" AND "),
            idx,
            idx + 1
        );

        let mut q = sqlx::query_as::<_, AuditLog>(&sql);
        if let Some(ref t) = query.entity_type {
            q = q.bind(t);
        }
        if let Some(id) = query.entity_id {
            q = q.bind(id);
        }
        if let Some(a) = query.action {
            q = q.bind(a);
        }
        let logs = q
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;
        Ok(logs)
    }
}

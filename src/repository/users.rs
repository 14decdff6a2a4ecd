//! Users repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::user::{User, UserQuery},
};

#[derive(Clone)]
pub struct UsersRepository {
    pool: Pool<Postgres>,
}

impl UsersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get user by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User with id {} not found", id)))
    }

    /// Get user by email (the login identifier)
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// List users with filters and paging
    pub async fn list(&self, query: &UserQuery) -> AppResult<(Vec<User>, i64)> {
        let mut conditions = vec!["TRUE".to_string()];
        let mut idx = 1;

        if query.search.is_some() {
            conditions.push(format!("(name ILIKE ${i} OR email ILIKE ${i})", i = idx));
            idx += 1;
        }
        if query.department.is_some() {
            conditions.push(format!("department = ${}", idx));
            idx += 1;
        }
        if query.active_only == Some(true) {
            conditions.push("is_active".to_string());
        }

        let where_clause = conditions.join(" AND ");
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 200);

        let search_pattern = query.search.as_ref().map(|s| format!("%{}%", s));

        let count_sql = format!("SELECT COUNT(*) FROM users WHERE {}", where_clause);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(ref p) = search_pattern {
            count_query = count_query.bind(p);
        }
        if let Some(ref d) = query.department {
            count_query = count_query.bind(d);
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let list_sql = format!(
            "SELECT * FROM users WHERE {} ORDER BY name LIMIT ${} OFFSET ${}",
            where_clause,
            idx,
            idx + 1
        );
        let mut list_query = sqlx::query_as::<_, User>(&list_sql);
        if let Some(ref p) = search_pattern {
            list_query = list_query.bind(p);
        }
        if let Some(ref d) = query.department {
            list_query = list_query.bind(d);
        }
        let users = list_query
            .bind(per_page)
            .bind((page - 1) * per_page)
            .fetch_all(&self.pool)
            .await?;

        Ok((users, total))
    }
}

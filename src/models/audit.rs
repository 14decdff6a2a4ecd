//! Audit log model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::enums::AuditAction;

/// Append-only audit log entry with before/after snapshots
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct AuditLog {
    pub id: i32,
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: i32,
    pub actor_id: Option<i32>,
    pub actor_email: Option<String>,
    #[schema(value_type = Object)]
    pub old_values: Option<serde_json::Value>,
    #[schema(value_type = Object)]
    pub new_values: Option<serde_json::Value>,
    pub changed_fields: Option<Vec<String>>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Entry to be written; the id and timestamp are assigned by the store
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub action: AuditAction,
    pub entity_type: String,
    pub entity_id: i32,
    pub actor_id: Option<i32>,
    pub actor_email: Option<String>,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub changed_fields: Option<Vec<String>>,
    pub description: Option<String>,
}

/// Audit log list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct AuditLogQuery {
    pub entity_type: Option<String>,
    pub entity_id: Option<i32>,
    pub action: Option<AuditAction>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

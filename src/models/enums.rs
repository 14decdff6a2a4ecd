//! Shared domain enums, stored as text slugs in Postgres

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, Postgres};
use utoipa::ToSchema;

/// Implements the sqlx text-column plumbing for a slug enum.
macro_rules! impl_pg_text_enum {
    ($name:ident) => {
        impl sqlx::Type<Postgres> for $name {
            fn type_info() -> sqlx::postgres::PgTypeInfo {
                <String as sqlx::Type<Postgres>>::type_info()
            }
        }

        impl<'r> Decode<'r, Postgres> for $name {
            fn decode(
                value: sqlx::postgres::PgValueRef<'r>,
            ) -> Result<Self, sqlx::error::BoxDynError> {
                let s: String = Decode::<Postgres>::decode(value)?;
                s.parse().map_err(|e: String| e.into())
            }
        }

        impl Encode<'_, Postgres> for $name {
            fn encode_by_ref(
                &self,
                buf: &mut sqlx::postgres::PgArgumentBuffer,
            ) -> sqlx::encode::IsNull {
                let s: String = self.as_str().to_string();
                <String as Encode<Postgres>>::encode(s, buf)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// AssetCategory
// ---------------------------------------------------------------------------

/// Asset category classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Laptop,
    Desktop,
    Monitor,
    Printer,
    Phone,
    Tablet,
    Server,
    NetworkDevice,
    SoftwareLicense,
    Toner,
    Other,
}

impl AssetCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCategory::Laptop => "laptop",
            AssetCategory::Desktop => "desktop",
            AssetCategory::Monitor => "monitor",
            AssetCategory::Printer => "printer",
            AssetCategory::Phone => "phone",
            AssetCategory::Tablet => "tablet",
            AssetCategory::Server => "server",
            AssetCategory::NetworkDevice => "network_device",
            AssetCategory::SoftwareLicense => "software_license",
            AssetCategory::Toner => "toner",
            AssetCategory::Other => "other",
        }
    }

    /// Short letter code used in generated asset tags (IT-<code>-NNNN)
    pub fn tag_code(&self) -> &'static str {
        match self {
            AssetCategory::Laptop => "LT",
            AssetCategory::Desktop => "DT",
            AssetCategory::Monitor => "MN",
            AssetCategory::Printer => "PR",
            AssetCategory::Phone => "PH",
            AssetCategory::Tablet => "TB",
            AssetCategory::Server => "SRV",
            AssetCategory::NetworkDevice => "ND",
            AssetCategory::SoftwareLicense => "SW",
            AssetCategory::Toner => "TN",
            AssetCategory::Other => "OT",
        }
    }
}

impl std::str::FromStr for AssetCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "laptop" => Ok(AssetCategory::Laptop),
            "desktop" => Ok(AssetCategory::Desktop),
            "monitor" => Ok(AssetCategory::Monitor),
            "printer" => Ok(AssetCategory::Printer),
            "phone" => Ok(AssetCategory::Phone),
            "tablet" => Ok(AssetCategory::Tablet),
            "server" => Ok(AssetCategory::Server),
            "network_device" => Ok(AssetCategory::NetworkDevice),
            "software_license" => Ok(AssetCategory::SoftwareLicense),
            "toner" => Ok(AssetCategory::Toner),
            "other" => Ok(AssetCategory::Other),
            _ => Err(format!("Invalid asset category: {}", s)),
        }
    }
}

impl_pg_text_enum!(AssetCategory);

// ---------------------------------------------------------------------------
// AssetStatus
// ---------------------------------------------------------------------------

/// Asset availability status; the single source of truth for whether
/// an asset can be assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    Available,
    Assigned,
    Maintenance,
    Repair,
    Retired,
    Lost,
    Stolen,
}

impl AssetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetStatus::Available => "available",
            AssetStatus::Assigned => "assigned",
            AssetStatus::Maintenance => "maintenance",
            AssetStatus::Repair => "repair",
            AssetStatus::Retired => "retired",
            AssetStatus::Lost => "lost",
            AssetStatus::Stolen => "stolen",
        }
    }
}

impl std::str::FromStr for AssetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "available" => Ok(AssetStatus::Available),
            "assigned" => Ok(AssetStatus::Assigned),
            "maintenance" => Ok(AssetStatus::Maintenance),
            "repair" => Ok(AssetStatus::Repair),
            "retired" => Ok(AssetStatus::Retired),
            "lost" => Ok(AssetStatus::Lost),
            "stolen" => Ok(AssetStatus::Stolen),
            _ => Err(format!("Invalid asset status: {}", s)),
        }
    }
}

impl_pg_text_enum!(AssetStatus);

// ---------------------------------------------------------------------------
// AssetCondition
// ---------------------------------------------------------------------------

/// Physical condition of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetCondition {
    New,
    Excellent,
    Good,
    Fair,
    Poor,
    Damaged,
}

impl AssetCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetCondition::New => "new",
            AssetCondition::Excellent => "excellent",
            AssetCondition::Good => "good",
            AssetCondition::Fair => "fair",
            AssetCondition::Poor => "poor",
            AssetCondition::Damaged => "damaged",
        }
    }
}

impl std::str::FromStr for AssetCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(AssetCondition::New),
            "excellent" => Ok(AssetCondition::Excellent),
            "good" => Ok(AssetCondition::Good),
            "fair" => Ok(AssetCondition::Fair),
            "poor" => Ok(AssetCondition::Poor),
            "damaged" => Ok(AssetCondition::Damaged),
            _ => Err(format!("Invalid asset condition: {}", s)),
        }
    }
}

impl_pg_text_enum!(AssetCondition);

// ---------------------------------------------------------------------------
// AssignmentStatus
// ---------------------------------------------------------------------------

/// Assignment lifecycle state. `Active` is the only state reachable at
/// creation; the rest are reached via return/update/bulk operations.
/// Overdue-ness is computed at query time, never auto-transitioned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Active,
    Returned,
    Overdue,
    Lost,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Active => "active",
            AssignmentStatus::Returned => "returned",
            AssignmentStatus::Overdue => "overdue",
            AssignmentStatus::Lost => "lost",
        }
    }
}

impl std::str::FromStr for AssignmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(AssignmentStatus::Active),
            "returned" => Ok(AssignmentStatus::Returned),
            "overdue" => Ok(AssignmentStatus::Overdue),
            "lost" => Ok(AssignmentStatus::Lost),
            _ => Err(format!("Invalid assignment status: {}", s)),
        }
    }
}

impl_pg_text_enum!(AssignmentStatus);

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// User role, ordered from least to most privileged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Viewer,
    User,
    Manager,
    Admin,
    SuperAdmin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Viewer => "viewer",
            UserRole::User => "user",
            UserRole::Manager => "manager",
            UserRole::Admin => "admin",
            UserRole::SuperAdmin => "super_admin",
        }
    }

    /// Numeric privilege rank for hierarchy comparisons
    pub fn rank(&self) -> u8 {
        match self {
            UserRole::Viewer => 0,
            UserRole::User => 1,
            UserRole::Manager => 2,
            UserRole::Admin => 3,
            UserRole::SuperAdmin => 4,
        }
    }

    pub fn at_least(&self, other: UserRole) -> bool {
        self.rank() >= other.rank()
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "viewer" => Ok(UserRole::Viewer),
            "user" => Ok(UserRole::User),
            "manager" => Ok(UserRole::Manager),
            "admin" => Ok(UserRole::Admin),
            "super_admin" => Ok(UserRole::SuperAdmin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl_pg_text_enum!(UserRole);

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Audited action kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Assign,
    Return,
    BulkOperation,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::Delete => "delete",
            AuditAction::Assign => "assign",
            AuditAction::Return => "return",
            AuditAction::BulkOperation => "bulk_operation",
        }
    }
}

impl std::str::FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "delete" => Ok(AuditAction::Delete),
            "assign" => Ok(AuditAction::Assign),
            "return" => Ok(AuditAction::Return),
            "bulk_operation" => Ok(AuditAction::BulkOperation),
            _ => Err(format!("Invalid audit action: {}", s)),
        }
    }
}

impl_pg_text_enum!(AuditAction);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_slugs_round_trip() {
        for c in [
            AssetCategory::Laptop,
            AssetCategory::NetworkDevice,
            AssetCategory::SoftwareLicense,
            AssetCategory::Other,
        ] {
            assert_eq!(c.as_str().parse::<AssetCategory>().unwrap(), c);
        }
    }

    #[test]
    fn tag_codes_are_two_or_three_letters() {
        for c in [
            AssetCategory::Laptop,
            AssetCategory::Desktop,
            AssetCategory::Monitor,
            AssetCategory::Printer,
            AssetCategory::Phone,
            AssetCategory::Tablet,
            AssetCategory::Server,
            AssetCategory::NetworkDevice,
            AssetCategory::SoftwareLicense,
            AssetCategory::Toner,
            AssetCategory::Other,
        ] {
            let code = c.tag_code();
            assert!(code.len() == 2 || code.len() == 3);
            assert!(code.chars().all(|ch| ch.is_ascii_uppercase()));
        }
    }

    #[test]
    fn role_hierarchy_is_ordered() {
        assert!(UserRole::SuperAdmin.at_least(UserRole::Admin));
        assert!(UserRole::Admin.at_least(UserRole::Manager));
        assert!(UserRole::Manager.at_least(UserRole::Manager));
        assert!(!UserRole::User.at_least(UserRole::Manager));
        assert!(!UserRole::Viewer.at_least(UserRole::User));
    }

    #[test]
    fn unknown_slug_is_rejected() {
        assert!("broken".parse::<AssetStatus>().is_err());
        assert!("root".parse::<UserRole>().is_err());
    }
}

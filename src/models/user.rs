//! User model and JWT claims
//!
//! Users are an identity source consumed by the inventory; the server only
//! reads them (plus login), it does not manage accounts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use crate::error::AppError;

use super::enums::UserRole;

/// User record from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    /// Argon2 hash, managed by the identity provisioning process
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub department: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User list query parameters
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UserQuery {
    /// Match against name or email
    pub search: Option<String>,
    pub department: Option<String>,
    pub active_only: Option<bool>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// JWT claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    /// User email
    pub sub: String,
    pub user_id: i32,
    pub role: UserRole,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    fn require_role(&self, min: UserRole) -> Result<(), AppError> {
        if self.role.at_least(min) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Insufficient permissions: {} role required",
                min
            )))
        }
    }

    /// Manager tier: asset and assignment lifecycle operations
    pub fn require_manager(&self) -> Result<(), AppError> {
        self.require_role(UserRole::Manager)
    }

    /// Admin tier: soft-delete and other destructive operations
    pub fn require_admin(&self) -> Result<(), AppError> {
        self.require_role(UserRole::Admin)
    }

    /// Any authenticated, non-viewer user
    pub fn require_user(&self) -> Result<(), AppError> {
        self.require_role(UserRole::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: UserRole) -> UserClaims {
        UserClaims {
            sub: "test@example.org".to_string(),
            user_id: 1,
            role,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn manager_tier_checks() {
        assert!(claims(UserRole::Manager).require_manager().is_ok());
        assert!(claims(UserRole::Admin).require_manager().is_ok());
        assert!(claims(UserRole::SuperAdmin).require_manager().is_ok());
        assert!(claims(UserRole::User).require_manager().is_err());
        assert!(claims(UserRole::Viewer).require_manager().is_err());
    }

    #[test]
    fn admin_tier_is_stricter_than_manager() {
        assert!(claims(UserRole::Manager).require_admin().is_err());
        assert!(claims(UserRole::Admin).require_admin().is_ok());
    }

    #[test]
    fn token_round_trip() {
        let c = UserClaims {
            sub: "it@example.org".to_string(),
            user_id: 7,
            role: UserRole::Admin,
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: chrono::Utc::now().timestamp(),
        };
        let token = c.create_token("secret").unwrap();
        let parsed = UserClaims::from_token(&token, "secret").unwrap();
        assert_eq!(parsed.user_id, 7);
        assert_eq!(parsed.role, UserRole::Admin);
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }
}

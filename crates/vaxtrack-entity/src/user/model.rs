//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;
use super::status::UserStatus;

/// A registered user in the VaxTrack system.
///
/// The core consumes users read-only: account management, credentials,
/// and sessions belong to the identity collaborator.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Full display name.
    pub full_name: String,
    /// Email address (optional).
    pub email: Option<String>,
    /// User role (RBAC).
    pub role: UserRole,
    /// Account status.
    pub status: UserStatus,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Check if the user is active and not soft-deleted.
    pub fn is_active(&self) -> bool {
        self.status.is_active() && self.deleted_at.is_none()
    }

    /// Check if this user has manager privileges.
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Check if this user may administer doses.
    pub fn is_nurse(&self) -> bool {
        self.role.is_nurse()
    }
}

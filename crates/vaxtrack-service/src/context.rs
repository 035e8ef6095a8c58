//! Request context carrying the authenticated caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use vaxtrack_entity::user::UserRole;

/// Context for the current authenticated request.
///
/// Built by the (out-of-scope) authentication middleware and passed
/// into service methods so that every operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: Uuid,
    /// The user's role at authentication time.
    pub role: UserRole,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context stamped with the current time.
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            role,
            request_time: Utc::now(),
        }
    }

    /// Returns whether the current user is a manager.
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    /// Returns whether the current user is a nurse.
    pub fn is_nurse(&self) -> bool {
        self.role.is_nurse()
    }
}

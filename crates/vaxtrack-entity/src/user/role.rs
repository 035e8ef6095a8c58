//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available in the RBAC system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Receives doses; sees only their own records.
    Employee,
    /// Administers doses; sees own records and doses they applied.
    Nurse,
    /// Full visibility and management of schedulings, applications,
    /// and inventory.
    Manager,
}

impl UserRole {
    /// Check if this role is a manager.
    pub fn is_manager(&self) -> bool {
        matches!(self, Self::Manager)
    }

    /// Check if this role may administer doses.
    pub fn is_nurse(&self) -> bool {
        matches!(self, Self::Nurse)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Nurse => "nurse",
            Self::Manager => "manager",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = vaxtrack_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "employee" => Ok(Self::Employee),
            "nurse" => Ok(Self::Nurse),
            "manager" => Ok(Self::Manager),
            _ => Err(vaxtrack_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: employee, nurse, manager"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("nurse".parse::<UserRole>().unwrap(), UserRole::Nurse);
        assert_eq!("MANAGER".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert!("admin".parse::<UserRole>().is_err());
    }
}

//! Role-scoped visibility and mutation rules.
//!
//! Pure functions consumed by every service. The inputs are the
//! caller's context and the ownership facts of the targeted resource;
//! no I/O happens here.

use uuid::Uuid;

use vaxtrack_database::store::ApplicationFilter;
use vaxtrack_entity::user::UserRole;

use crate::context::RequestContext;

/// Whether the caller may view an application.
///
/// Managers see any; nurses see their own doses and doses they
/// administered; employees see only their own.
pub fn can_view_application(ctx: &RequestContext, owner_id: Uuid, applied_by: Uuid) -> bool {
    match ctx.role {
        UserRole::Manager => true,
        UserRole::Nurse => ctx.user_id == owner_id || ctx.user_id == applied_by,
        UserRole::Employee => ctx.user_id == owner_id,
    }
}

/// Whether the caller may correct an application's annotation fields.
///
/// Only the administering nurse or a manager.
pub fn can_update_application(ctx: &RequestContext, applied_by: Uuid) -> bool {
    ctx.is_manager() || ctx.user_id == applied_by
}

/// Scope an application list filter to what the caller may see.
///
/// Employees are forced onto their own records regardless of the
/// requested filter; nurses and managers pass through unrestricted.
pub fn scope_application_filter(
    ctx: &RequestContext,
    mut filter: ApplicationFilter,
) -> ApplicationFilter {
    if ctx.role == UserRole::Employee {
        filter.user_id = Some(ctx.user_id);
    }
    filter
}

/// Whether the caller may update or cancel a scheduling.
///
/// The owner or a manager.
pub fn can_manage_scheduling(ctx: &RequestContext, owner_id: Uuid) -> bool {
    ctx.is_manager() || ctx.user_id == owner_id
}

/// Whether the caller may view a scheduling.
///
/// The owner, the assigned nurse, or a manager.
pub fn can_view_scheduling(
    ctx: &RequestContext,
    owner_id: Uuid,
    assigned_nurse_id: Option<Uuid>,
) -> bool {
    ctx.is_manager() || ctx.user_id == owner_id || assigned_nurse_id == Some(ctx.user_id)
}

/// Whether the caller may create a scheduling for `target_user_id`.
///
/// Managers may schedule for anyone; employees and nurses only for
/// themselves.
pub fn can_create_scheduling_for(ctx: &RequestContext, target_user_id: Uuid) -> bool {
    ctx.is_manager() || ctx.user_id == target_user_id
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(role: UserRole) -> RequestContext {
        RequestContext::new(Uuid::new_v4(), role)
    }

    #[test]
    fn test_view_application_by_role() {
        let owner = Uuid::new_v4();
        let nurse_id = Uuid::new_v4();

        let manager = ctx(UserRole::Manager);
        assert!(can_view_application(&manager, owner, nurse_id));

        let employee = ctx(UserRole::Employee);
        assert!(!can_view_application(&employee, owner, nurse_id));
        assert!(can_view_application(&employee, employee.user_id, nurse_id));

        let nurse = ctx(UserRole::Nurse);
        assert!(!can_view_application(&nurse, owner, nurse_id));
        assert!(can_view_application(&nurse, owner, nurse.user_id));
        assert!(can_view_application(&nurse, nurse.user_id, nurse_id));
    }

    #[test]
    fn test_update_application_restricted_to_applier_or_manager() {
        let applied_by = Uuid::new_v4();

        assert!(can_update_application(&ctx(UserRole::Manager), applied_by));
        assert!(!can_update_application(&ctx(UserRole::Nurse), applied_by));

        let applier = RequestContext::new(applied_by, UserRole::Nurse);
        assert!(can_update_application(&applier, applied_by));
    }

    #[test]
    fn test_employee_list_filter_forced_to_self() {
        let employee = ctx(UserRole::Employee);
        let someone_else = Uuid::new_v4();

        let scoped = scope_application_filter(
            &employee,
            ApplicationFilter {
                user_id: Some(someone_else),
                ..Default::default()
            },
        );
        assert_eq!(scoped.user_id, Some(employee.user_id));

        let nurse = ctx(UserRole::Nurse);
        let scoped = scope_application_filter(
            &nurse,
            ApplicationFilter {
                user_id: Some(someone_else),
                ..Default::default()
            },
        );
        assert_eq!(scoped.user_id, Some(someone_else));
    }

    #[test]
    fn test_scheduling_creation_for_others_is_manager_only() {
        let target = Uuid::new_v4();

        assert!(can_create_scheduling_for(&ctx(UserRole::Manager), target));
        assert!(!can_create_scheduling_for(&ctx(UserRole::Nurse), target));
        assert!(!can_create_scheduling_for(&ctx(UserRole::Employee), target));

        let employee = ctx(UserRole::Employee);
        assert!(can_create_scheduling_for(&employee, employee.user_id));
    }

    #[test]
    fn test_manage_scheduling_owner_or_manager() {
        let owner = Uuid::new_v4();

        assert!(can_manage_scheduling(&ctx(UserRole::Manager), owner));
        assert!(!can_manage_scheduling(&ctx(UserRole::Nurse), owner));

        let owner_ctx = RequestContext::new(owner, UserRole::Employee);
        assert!(can_manage_scheduling(&owner_ctx, owner));
    }
}

use crate::domain::access::{AccessReason, AccessResult, Principal, Role};
use crate::domain::course::CourseRecord;

/// Content-access decision for one user and one course. Ordering is
/// load-bearing: admin and owning-professor checks run before the
/// published check so draft courses stay visible to the people editing
/// them, and the enrollment check runs before any pricing rule.
pub fn resolve_access(
    principal: Option<&Principal>,
    course: &CourseRecord,
    enrolled: bool,
) -> AccessResult {
    let Some(principal) = principal else {
        return AccessResult::denied(AccessReason::NotAuthenticated);
    };

    if principal.role == Role::Admin {
        return AccessResult::granted(AccessReason::AdminAccess);
    }

    if principal.role == Role::Professor && course.professor_id == principal.user_id {
        return AccessResult::granted(AccessReason::ProfessorOwns);
    }

    if !course.is_published {
        return AccessResult::denied(AccessReason::NotPublished);
    }

    if enrolled {
        return AccessResult::granted(AccessReason::Enrolled);
    }

    if course.is_free() {
        return AccessResult {
            has_access: false,
            reason: AccessReason::FreeCourse,
            requires_payment: false,
            can_enroll: true,
        };
    }

    AccessResult {
        has_access: false,
        reason: AccessReason::PaymentRequired,
        requires_payment: true,
        can_enroll: true,
    }
}

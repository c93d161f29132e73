use course_payments::access::resolver::resolve_access;
use course_payments::domain::access::{AccessReason, Principal, Role};
use course_payments::domain::course::CourseRecord;
use uuid::Uuid;

#[test]
fn unauthenticated_user_is_denied() {
    let course = course(Some(50000), true);
    let result = resolve_access(None, &course, false);
    assert!(!result.has_access);
    assert_eq!(result.reason, AccessReason::NotAuthenticated);
    assert!(!result.can_enroll);
}

#[test]
fn unauthenticated_user_denied_even_for_free_course() {
    let course = course(None, true);
    let result = resolve_access(None, &course, false);
    assert!(!result.has_access);
    assert_eq!(result.reason, AccessReason::NotAuthenticated);
}

#[test]
fn admin_sees_everything_including_drafts() {
    let course = course(Some(50000), false);
    let admin = principal(Role::Admin);
    let result = resolve_access(Some(&admin), &course, false);
    assert!(result.has_access);
    assert_eq!(result.reason, AccessReason::AdminAccess);
}

#[test]
fn owning_professor_sees_own_draft() {
    let mut course = course(Some(50000), false);
    let professor = principal(Role::Professor);
    course.professor_id = professor.user_id;
    let result = resolve_access(Some(&professor), &course, false);
    assert!(result.has_access);
    assert_eq!(result.reason, AccessReason::ProfessorOwns);
}

#[test]
fn other_professor_blocked_by_published_check() {
    let course = course(Some(50000), false);
    let professor = principal(Role::Professor);
    let result = resolve_access(Some(&professor), &course, false);
    assert!(!result.has_access);
    assert_eq!(result.reason, AccessReason::NotPublished);
}

#[test]
fn student_cannot_see_draft() {
    let course = course(None, false);
    let student = principal(Role::Student);
    let result = resolve_access(Some(&student), &course, false);
    assert!(!result.has_access);
    assert_eq!(result.reason, AccessReason::NotPublished);
}

#[test]
fn enrolled_student_has_access_to_paid_course() {
    let course = course(Some(50000), true);
    let student = principal(Role::Student);
    let result = resolve_access(Some(&student), &course, true);
    assert!(result.has_access);
    assert_eq!(result.reason, AccessReason::Enrolled);
}

#[test]
fn unenrolled_student_on_free_course_can_enroll() {
    let course = course(None, true);
    let student = principal(Role::Student);
    let result = resolve_access(Some(&student), &course, false);
    assert!(!result.has_access);
    assert_eq!(result.reason, AccessReason::FreeCourse);
    assert!(result.can_enroll);
    assert!(!result.requires_payment);
}

#[test]
fn zero_price_counts_as_free() {
    let course = course(Some(0), true);
    let student = principal(Role::Student);
    let result = resolve_access(Some(&student), &course, false);
    assert_eq!(result.reason, AccessReason::FreeCourse);
}

#[test]
fn paid_course_requires_payment() {
    let course = course(Some(50000), true);
    let student = principal(Role::Student);
    let result = resolve_access(Some(&student), &course, false);
    assert!(!result.has_access);
    assert_eq!(result.reason, AccessReason::PaymentRequired);
    assert!(result.requires_payment);
    assert!(result.can_enroll);
}

#[test]
fn enrollment_check_runs_before_pricing() {
    let course = course(None, true);
    let student = principal(Role::Student);
    let result = resolve_access(Some(&student), &course, true);
    assert!(result.has_access);
    assert_eq!(result.reason, AccessReason::Enrolled);
}

fn course(price_cents: Option<i64>, is_published: bool) -> CourseRecord {
    CourseRecord {
        id: Uuid::new_v4(),
        professor_id: Uuid::new_v4(),
        title: "Intro to Linear Algebra".to_string(),
        price_cents,
        currency: "EGP".to_string(),
        is_published,
        enrollment_count: 0,
        created_at: chrono::Utc::now(),
    }
}

fn principal(role: Role) -> Principal {
    Principal {
        user_id: Uuid::new_v4(),
        role,
    }
}

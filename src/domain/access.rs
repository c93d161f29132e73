use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Student,
    Professor,
    Admin,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "STUDENT" => Some(Role::Student),
            "PROFESSOR" => Some(Role::Professor),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessReason {
    NotAuthenticated,
    AdminAccess,
    ProfessorOwns,
    NotPublished,
    Enrolled,
    FreeCourse,
    PaymentRequired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessResult {
    pub has_access: bool,
    pub reason: AccessReason,
    pub requires_payment: bool,
    pub can_enroll: bool,
}

impl AccessResult {
    pub fn granted(reason: AccessReason) -> Self {
        Self {
            has_access: true,
            reason,
            requires_payment: false,
            can_enroll: false,
        }
    }

    pub fn denied(reason: AccessReason) -> Self {
        Self {
            has_access: false,
            reason,
            requires_payment: false,
            can_enroll: false,
        }
    }
}

use serde::Serialize;

/// What an operator is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Admin,
    Staff,
}

/// Actions gated behind operator credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Manual check-in and cancel.
    CheckIn,
    /// Destructive roster/session changes and operator management.
    ManageRoster,
}

impl Role {
    pub fn code(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Convert DB / CLI string → enum (case-insensitive)
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "staff" => Some(Role::Staff),
            _ => None,
        }
    }

    pub fn allows(&self, permission: Permission) -> bool {
        match (self, permission) {
            (Role::Admin, _) => true,
            (Role::Staff, Permission::CheckIn) => true,
            (Role::Staff, Permission::ManageRoster) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Operator {
    pub name: String,
    pub role: Role,
    pub salt: String,          // ⇔ operators.salt (hex)
    pub passcode_hash: String, // ⇔ operators.passcode_hash (hex sha256)
    pub created_at: String,    // ⇔ operators.created_at (ISO8601)
}

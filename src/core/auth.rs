//! Operator credentials and role checks.
//!
//! Passcodes are never stored: each operator keeps a random salt and the
//! hex SHA-256 of `salt || passcode`.

use crate::db::repository::Repository;
use crate::errors::{AppError, AppResult};
use crate::models::operator::{Operator, Permission, Role};
use chrono::Local;
use sha2::{Digest, Sha256};

/// Minimum passcode length accepted when registering an operator.
pub const MIN_PASSCODE_LEN: usize = 4;

/// Name + passcode as typed by the person at the desk.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub operator: String,
    pub passcode: String,
}

/// Proof that a permission check passed.
#[derive(Debug, Clone)]
pub struct Grant {
    pub operator: String,
    pub role: Role,
}

pub fn hash_passcode(salt: &str, passcode: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(passcode.as_bytes());
    hex::encode(hasher.finalize())
}

fn new_salt() -> String {
    let bytes: [u8; 16] = rand::random();
    hex::encode(bytes)
}

/// Build an operator record with a fresh salt.
pub fn new_operator(name: &str, role: Role, passcode: &str) -> AppResult<Operator> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::MissingField("operator name"));
    }
    if passcode.chars().count() < MIN_PASSCODE_LEN {
        return Err(AppError::Unauthorized(format!(
            "passcode must be at least {} characters",
            MIN_PASSCODE_LEN
        )));
    }

    let salt = new_salt();
    Ok(Operator {
        name: name.to_string(),
        role,
        passcode_hash: hash_passcode(&salt, passcode),
        salt,
        created_at: Local::now().to_rfc3339(),
    })
}

pub fn verify(op: &Operator, passcode: &str) -> bool {
    hash_passcode(&op.salt, passcode) == op.passcode_hash
}

pub struct Authorizer<'r> {
    repo: &'r Repository,
}

impl<'r> Authorizer<'r> {
    pub fn new(repo: &'r Repository) -> Self {
        Self { repo }
    }

    /// True while no operator exists yet (first admin may be created freely).
    pub fn is_bootstrap(&self) -> AppResult<bool> {
        Ok(self.repo.list_operators()?.is_empty())
    }

    pub fn authorize(&self, creds: &Credentials, permission: Permission) -> AppResult<Grant> {
        // same message for unknown operator and wrong passcode
        let denied = || AppError::Unauthorized("unknown operator or wrong passcode".into());

        let op = self.repo.find_operator(&creds.operator)?.ok_or_else(denied)?;
        if !verify(&op, &creds.passcode) {
            self.repo
                .audit("auth_failed", &creds.operator, &format!("{:?}", permission));
            return Err(denied());
        }

        if !op.role.allows(permission) {
            return Err(AppError::Unauthorized(format!(
                "operator '{}' ({}) may not perform {:?}",
                op.name,
                op.role.code(),
                permission
            )));
        }

        Ok(Grant {
            operator: op.name,
            role: op.role,
        })
    }
}

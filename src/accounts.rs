//! Credential store: user records behind a cloneable, internally synchronized
//! handle. Passwords are stored as Argon2 PHC strings and verified through the
//! `argon2` crate; the plain hash never leaves this module.

use std::collections::HashMap;
use std::sync::Arc;

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use parking_lot::RwLock;
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AuthError, AuthResult};

/// Internal role enum; the external `kind` string exists only at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Administrator,
    Professor,
    Student,
}

impl Role {
    /// External representation used in the login response (`user.kind`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Professor => "professor",
            Role::Student => "student",
        }
    }

    pub fn is_administrator(&self) -> bool {
        matches!(self, Role::Administrator)
    }
}

/// A stored user record. Deliberately not `Serialize`: no read path may return
/// the password hash, so anything crossing the boundary goes through an
/// explicit projection instead.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
    password_hash: String,
}

/// Provisioning input; the plaintext password is hashed on insert.
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

/// A validated profile mutation, applied atomically under one write lock.
#[derive(Debug, Default)]
pub struct ProfileChange {
    /// `(old_password, new_password)`. The old password is re-verified under
    /// the lock so the check and the swap cannot interleave with another writer.
    pub password: Option<(String, String)>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Shared mutable account table. Cheap to clone; all synchronization is
/// internal so isolated instances can be constructed per test.
#[derive(Clone, Default)]
pub struct AccountStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with the fixture accounts (username == password):
    /// admin, professor and student.
    pub fn with_fixture_accounts() -> AuthResult<Self> {
        let store = Self::new();
        store.reset()?;
        Ok(store)
    }

    /// Drop every account and re-provision the fixture set.
    pub fn reset(&self) -> AuthResult<()> {
        let accounts = fixture_accounts();
        let mut fresh = HashMap::with_capacity(accounts.len());
        for account in accounts {
            let user = build_user(account)?;
            fresh.insert(user.username.clone(), user);
        }
        *self.users.write() = fresh;
        Ok(())
    }

    /// Insert or replace an account. Usernames are the unique key, so a
    /// duplicate insert replaces the previous record wholesale.
    pub fn add_account(&self, account: NewAccount) -> AuthResult<()> {
        let user = build_user(account)?;
        self.users.write().insert(user.username.clone(), user);
        Ok(())
    }

    /// Snapshot of a user record, if the username exists.
    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.users.read().get(username).cloned()
    }

    /// Verify a candidate password. Unknown usernames return false, so callers
    /// surface the same error for a missing account and a wrong password.
    pub fn verify_password(&self, username: &str, candidate: &str) -> bool {
        let users = self.users.read();
        match users.get(username) {
            Some(user) => verify_password(&user.password_hash, candidate),
            None => false,
        }
    }

    /// Apply a validated profile mutation under a single write lock. A
    /// successful change is immediately visible to subsequent logins; a failed
    /// one leaves nothing applied.
    pub fn apply_profile_change(&self, username: &str, change: ProfileChange) -> AuthResult<()> {
        let mut users = self.users.write();
        let user = users.get_mut(username).ok_or(AuthError::InvalidCredentials)?;

        let new_hash = match &change.password {
            Some((old, new)) => {
                if !verify_password(&user.password_hash, old) {
                    return Err(AuthError::InvalidOldPassword);
                }
                Some(hash_password(new)?)
            }
            None => None,
        };

        if let Some(hash) = new_hash {
            user.password_hash = hash;
        }
        if let Some(first_name) = change.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = change.last_name {
            user.last_name = last_name;
        }
        Ok(())
    }
}

fn build_user(account: NewAccount) -> AuthResult<User> {
    Ok(User {
        id: Uuid::new_v4(),
        username: account.username,
        first_name: account.first_name,
        last_name: account.last_name,
        role: account.role,
        password_hash: hash_password(&account.password)?,
    })
}

/// The fixed accounts the reset endpoint restores for repeatable testing.
fn fixture_accounts() -> Vec<NewAccount> {
    vec![
        NewAccount {
            username: "admin".to_string(),
            password: "admin".to_string(),
            first_name: "Admin".to_string(),
            last_name: "User".to_string(),
            role: Role::Administrator,
        },
        NewAccount {
            username: "professor".to_string(),
            password: "professor".to_string(),
            first_name: "Professor".to_string(),
            last_name: "User".to_string(),
            role: Role::Professor,
        },
        NewAccount {
            username: "student".to_string(),
            password: "student".to_string(),
            first_name: "Student".to_string(),
            last_name: "User".to_string(),
            role: Role::Student,
        },
    ]
}

fn hash_password(password: &str) -> AuthResult<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| AuthError::Internal(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AuthError::Internal(e.to_string()))?
        .to_string();
    Ok(phc)
}

fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        let argon2 = Argon2::default();
        argon2.verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::{Role, User};

/// The identity a live session is bound to: a snapshot of who logged in.
/// Roles never change within a session's lifetime, so the snapshot is enough
/// for every authorization decision downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            username: user.username.clone(),
            role: user.role,
        }
    }
}

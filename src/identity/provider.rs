use tracing::debug;

use crate::accounts::{AccountStore, User};
use crate::error::{AuthError, AuthResult};

use super::principal::Principal;
use super::session::{Session, SessionManager};

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The user snapshot rides along so the boundary can project
/// `{first_name, last_name, kind}` without a second store lookup.
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: Session,
    pub user: User,
}

pub trait AuthProvider: Send + Sync {
    fn login(&self, req: &LoginRequest) -> AuthResult<LoginResponse>;
}

/// Credential verification against the local account store.
#[derive(Clone)]
pub struct LocalAuthProvider {
    accounts: AccountStore,
    sessions: SessionManager,
}

impl LocalAuthProvider {
    pub fn new(accounts: AccountStore, sessions: SessionManager) -> Self {
        Self { accounts, sessions }
    }
}

impl AuthProvider for LocalAuthProvider {
    fn login(&self, req: &LoginRequest) -> AuthResult<LoginResponse> {
        // Unknown username and wrong password fail identically so the response
        // never reveals whether an account exists.
        if !self.accounts.verify_password(&req.username, &req.password) {
            return Err(AuthError::InvalidCredentials);
        }
        let user = self
            .accounts
            .find_by_username(&req.username)
            .ok_or(AuthError::InvalidCredentials)?;
        let session = self.sessions.issue(Principal::from(&user))?;
        debug!(user = %req.username, "login succeeded");
        Ok(LoginResponse { session, user })
    }
}

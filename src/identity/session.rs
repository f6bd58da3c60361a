use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::{AuthError, AuthResult};

use super::principal::Principal;

pub type SessionToken = String;

/// An Active session. The token is the only capability the caller holds; the
/// principal is the identity it resolves to.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SessionToken,
    pub principal: Principal,
    pub issued_at: Instant,
    pub expires_at: Option<Instant>,
}

#[derive(Debug)]
struct SessionEntry {
    session: Session,
}

/// Token lifecycle per entry: Active -> Revoked, terminal. Revoked tokens stay
/// in a tombstone set so a second revoke fails exactly like an unknown token.
///
/// Cheap to clone; all state lives behind shared locks so the manager can be
/// handed to every request handler. Constructed per instance, not as a
/// process-wide session table, which keeps tests isolated.
#[derive(Clone, Default)]
pub struct SessionManager {
    ttl: Option<Duration>,
    sessions: Arc<RwLock<HashMap<SessionToken, SessionEntry>>>,
    revoked: Arc<RwLock<HashSet<SessionToken>>>,
}

/// 256-bit random token, base64url without padding. Guessing is infeasible and
/// collisions are checked anyway because token uniqueness is what keeps one
/// session from resolving as another.
fn gen_token() -> AuthResult<SessionToken> {
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| AuthError::Internal(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

impl SessionManager {
    /// Sessions never expire; the contract exercises only explicit logout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sessions additionally lapse after `ttl`. Expired tokens behave exactly
    /// like revoked ones.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl: Some(ttl), ..Self::default() }
    }

    /// Mint a token bound to the principal; Active immediately.
    pub fn issue(&self, principal: Principal) -> AuthResult<Session> {
        let now = Instant::now();
        let mut sessions = self.sessions.write();
        let token = loop {
            let candidate = gen_token()?;
            if !sessions.contains_key(&candidate) && !self.revoked.read().contains(&candidate) {
                break candidate;
            }
        };
        let session = Session {
            token: token.clone(),
            principal,
            issued_at: now,
            expires_at: self.ttl.map(|ttl| now + ttl),
        };
        sessions.insert(token, SessionEntry { session: session.clone() });
        debug!(user = %session.principal.username, "session issued");
        Ok(session)
    }

    /// Active token -> bound principal. Absent, Revoked and expired tokens all
    /// return `None`; callers must not distinguish them externally.
    pub fn resolve(&self, token: &str) -> Option<Principal> {
        if self.revoked.read().contains(token) {
            return None;
        }
        let now = Instant::now();
        let mut expired = false;
        let out = {
            let sessions = self.sessions.read();
            match sessions.get(token) {
                Some(entry) => match entry.session.expires_at {
                    Some(deadline) if deadline <= now => {
                        expired = true;
                        None
                    }
                    _ => Some(entry.session.principal.clone()),
                },
                None => None,
            }
        };
        if expired {
            self.sessions.write().remove(token);
            self.revoked.write().insert(token.to_string());
        }
        out
    }

    /// Active -> Revoked. False for unknown, already-Revoked or expired
    /// tokens; the caller maps them all to the same credentials error.
    pub fn revoke(&self, token: &str) -> bool {
        let now = Instant::now();
        let removed = self.sessions.write().remove(token);
        match removed {
            Some(entry) => {
                self.revoked.write().insert(token.to_string());
                // An expired entry that never went through resolve is not
                // Active anymore; tombstone it but report failure.
                if matches!(entry.session.expires_at, Some(deadline) if deadline <= now) {
                    return false;
                }
                debug!(user = %entry.session.principal.username, "session revoked");
                true
            }
            None => false,
        }
    }

    /// Drop every session, live and revoked. Fixture-reset path.
    pub fn clear(&self) {
        self.sessions.write().clear();
        self.revoked.write().clear();
    }
}

//! Central identity and session management: login, opaque session tokens and
//! the field-level authorization policy. Keep the public surface thin and split
//! implementation across sub-modules.

mod authorizer;
mod principal;
mod provider;
mod session;

pub use authorizer::{field_edit_allowed, ProfileField};
pub use principal::Principal;
pub use provider::{AuthProvider, LocalAuthProvider, LoginRequest, LoginResponse};
pub use session::{Session, SessionManager, SessionToken};

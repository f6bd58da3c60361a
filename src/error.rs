//! Unified request outcome model and mapping helpers.
//! Every internal failure surfaces through [`AuthError`]; the HTTP layer maps it
//! to a `{status, code}` envelope and a status code via [`AuthError::http_status`].

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the auth/profile core, in precedence order. A request
/// that could fail several ways reports the first applicable kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Missing/invalid/revoked session token, or a failed login. Deliberately
    /// covers both unknown usernames and wrong passwords so the response never
    /// reveals whether an account exists, and both unknown and revoked tokens
    /// so it never acts as a token-enumeration oracle.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// Structurally invalid request, e.g. one of the old_password/password pair
    /// without the other.
    #[error("malformed data")]
    MalformedData,
    /// Password change requested but the supplied old password does not match.
    #[error("invalid old password")]
    InvalidOldPassword,
    /// Caller is authenticated but their role forbids a requested field.
    #[error("insufficient authorization")]
    InsufficientAuthorization,
    /// Unexpected failure inside the core (e.g. password hashing). Never part
    /// of the caller-input contract; surfaces as a 500 with an opaque code.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// External error code, as it appears in the response envelope.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "InvalidCredentials",
            AuthError::MalformedData => "MalformedData",
            AuthError::InvalidOldPassword => "InvalidOldPassword",
            AuthError::InsufficientAuthorization => "InsufficientAuthorization",
            AuthError::Internal(_) => "Unknown",
        }
    }

    /// Map to HTTP status code.
    ///
    /// `InsufficientAuthorization` maps to 401 and the credential failures to
    /// 403; inherited from the contract this service implements.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 403,
            AuthError::MalformedData => 400,
            AuthError::InvalidOldPassword => 403,
            AuthError::InsufficientAuthorization => 401,
            AuthError::Internal(_) => 500,
        }
    }
}

/// `{"status":"error","code":"<Kind>"}`
#[derive(Debug, Serialize)]
pub struct FailureResponse {
    status: &'static str,
    code: &'static str,
}

impl FailureResponse {
    pub fn new(err: AuthError) -> Self {
        Self { status: "error", code: err.code() }
    }
}

/// `{"status":"success"}`: the generic acknowledgement, no data echoed back.
#[derive(Debug, Serialize)]
pub struct SimpleSuccessResponse {
    status: &'static str,
}

impl SimpleSuccessResponse {
    pub fn new() -> Self {
        Self { status: "success" }
    }
}

impl Default for SimpleSuccessResponse {
    fn default() -> Self {
        Self::new()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.http_status(), 403);
        assert_eq!(AuthError::MalformedData.http_status(), 400);
        assert_eq!(AuthError::InvalidOldPassword.http_status(), 403);
        assert_eq!(AuthError::InsufficientAuthorization.http_status(), 401);
    }

    #[test]
    fn envelope_codes() {
        let json = serde_json::to_value(FailureResponse::new(AuthError::InvalidCredentials)).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], "InvalidCredentials");

        let json = serde_json::to_value(FailureResponse::new(AuthError::InsufficientAuthorization)).unwrap();
        assert_eq!(json["code"], "InsufficientAuthorization");
    }

    #[test]
    fn success_envelope() {
        let json = serde_json::to_value(SimpleSuccessResponse::new()).unwrap();
        assert_eq!(json, serde_json::json!({"status": "success"}));
    }
}

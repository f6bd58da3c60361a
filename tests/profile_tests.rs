//! Profile mutation tests: role-gated name edits, the old_password/password
//! pair rules and the password-change round trip, driven through login so the
//! flow matches what the HTTP surface does.

use anyhow::Result;

use campus_auth::accounts::AccountStore;
use campus_auth::error::AuthError;
use campus_auth::identity::{
    AuthProvider, LocalAuthProvider, LoginRequest, Principal, SessionManager,
};
use campus_auth::profile::{self, ProfileUpdate};

struct Harness {
    accounts: AccountStore,
    sessions: SessionManager,
    provider: LocalAuthProvider,
}

impl Harness {
    fn new() -> Result<Self> {
        let accounts = AccountStore::with_fixture_accounts()?;
        let sessions = SessionManager::new();
        let provider = LocalAuthProvider::new(accounts.clone(), sessions.clone());
        Ok(Self { accounts, sessions, provider })
    }

    /// Login and resolve the issued token, the way an authenticated request does.
    fn authed(&self, username: &str, password: &str) -> Principal {
        let resp = self
            .provider
            .login(&LoginRequest { username: username.into(), password: password.into() })
            .expect("login must succeed");
        self.sessions.resolve(&resp.session.token).expect("fresh token must resolve")
    }

    fn update(&self, principal: &Principal, update: ProfileUpdate) -> Result<(), AuthError> {
        profile::apply_update(&self.accounts, principal, update)
    }
}

#[test]
fn non_admin_name_updates_always_fail() -> Result<()> {
    let h = Harness::new()?;

    for username in ["professor", "student"] {
        let principal = h.authed(username, username);

        // A lone name field
        let err = h
            .update(&principal, ProfileUpdate { first_name: Some("New".into()), ..Default::default() })
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientAuthorization);

        // Name field alongside an otherwise valid password change
        let err = h
            .update(
                &principal,
                ProfileUpdate {
                    last_name: Some("New".into()),
                    old_password: Some(username.into()),
                    password: Some("next".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err, AuthError::InsufficientAuthorization);

        // Nothing was applied, including the password change
        assert!(h.accounts.verify_password(username, username));
    }
    Ok(())
}

#[test]
fn unpaired_password_fields_are_malformed() -> Result<()> {
    let h = Harness::new()?;
    let principal = h.authed("admin", "admin");

    let err = h
        .update(&principal, ProfileUpdate { old_password: Some("admin".into()), ..Default::default() })
        .unwrap_err();
    assert_eq!(err, AuthError::MalformedData);

    let err = h
        .update(&principal, ProfileUpdate { password: Some("next".into()), ..Default::default() })
        .unwrap_err();
    assert_eq!(err, AuthError::MalformedData);

    // Password unchanged either way
    assert!(h.accounts.verify_password("admin", "admin"));
    Ok(())
}

#[test]
fn wrong_old_password_leaves_stored_password_unchanged() -> Result<()> {
    let h = Harness::new()?;
    let principal = h.authed("student", "student");

    let err = h
        .update(
            &principal,
            ProfileUpdate {
                old_password: Some("not-the-password".into()),
                password: Some("next".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err, AuthError::InvalidOldPassword);
    assert!(h.accounts.verify_password("student", "student"));
    assert!(!h.accounts.verify_password("student", "next"));
    Ok(())
}

#[test]
fn password_change_round_trip() -> Result<()> {
    let h = Harness::new()?;
    let principal = h.authed("professor", "professor");

    h.update(
        &principal,
        ProfileUpdate {
            old_password: Some("professor".into()),
            password: Some("brand-new".into()),
            ..Default::default()
        },
    )
    .unwrap();

    // Immediately after the update: old password fails, new one succeeds
    let old = h.provider.login(&LoginRequest {
        username: "professor".into(),
        password: "professor".into(),
    });
    assert_eq!(old.map(|_| ()), Err(AuthError::InvalidCredentials));

    let fresh = h.authed("professor", "brand-new");
    assert_eq!(fresh.username, "professor");
    Ok(())
}

#[test]
fn admin_name_update_shows_up_at_next_login() -> Result<()> {
    let h = Harness::new()?;
    let principal = h.authed("admin", "admin");

    h.update(
        &principal,
        ProfileUpdate {
            first_name: Some("Grand".into()),
            last_name: Some("Overseer".into()),
            ..Default::default()
        },
    )
    .unwrap();

    let resp = h
        .provider
        .login(&LoginRequest { username: "admin".into(), password: "admin".into() })
        .unwrap();
    assert_eq!(resp.user.first_name, "Grand");
    assert_eq!(resp.user.last_name, "Overseer");
    Ok(())
}

#[test]
fn empty_update_succeeds_without_changes() -> Result<()> {
    let h = Harness::new()?;
    let principal = h.authed("student", "student");
    h.update(&principal, ProfileUpdate::default()).unwrap();
    assert!(h.accounts.verify_password("student", "student"));
    Ok(())
}

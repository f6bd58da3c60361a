//! Profile mutation handler: validates a partial update, consults the
//! field-level policy and applies the surviving changes through the store.
//! Every failure short-circuits before anything is applied; a request is
//! applied in full or not at all.

use serde::Deserialize;
use tracing::debug;

use crate::accounts::{AccountStore, ProfileChange};
use crate::error::{AuthError, AuthResult};
use crate::identity::{field_edit_allowed, Principal, ProfileField};

/// Partial update body for `PUT /api/profile`. Absent fields are left alone.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub old_password: Option<String>,
    pub password: Option<String>,
}

/// Validate and apply a profile update for the authenticated principal.
///
/// Order matters and fixes the error precedence: malformed shape, then the
/// old-password proof, then per-field authorization, then one atomic apply.
/// The store re-verifies the old password under its write lock, so the proof
/// and the swap cannot interleave with a concurrent change.
pub fn apply_update(
    accounts: &AccountStore,
    principal: &Principal,
    update: ProfileUpdate,
) -> AuthResult<()> {
    let password = match (update.old_password, update.password) {
        (Some(old), Some(new)) => Some((old, new)),
        (None, None) => None,
        // One of the pair without the other
        _ => return Err(AuthError::MalformedData),
    };

    if let Some((old, _)) = &password {
        if !accounts.verify_password(&principal.username, old) {
            return Err(AuthError::InvalidOldPassword);
        }
    }

    let requested_fields = [
        update.first_name.as_ref().map(|_| ProfileField::FirstName),
        update.last_name.as_ref().map(|_| ProfileField::LastName),
    ];
    for field in requested_fields.into_iter().flatten() {
        if !field_edit_allowed(principal.role, field) {
            // The whole request fails; a password change riding along is not
            // applied either.
            return Err(AuthError::InsufficientAuthorization);
        }
    }

    accounts.apply_profile_change(
        &principal.username,
        ProfileChange {
            password,
            first_name: update.first_name,
            last_name: update.last_name,
        },
    )?;
    debug!(user = %principal.username, "profile updated");
    Ok(())
}

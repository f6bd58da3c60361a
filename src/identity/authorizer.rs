//! Field-level authorization: a pure decision over (role, field).
//!
//! Permission table for the mutable profile fields:
//!
//! | field                   | administrator | professor | student |
//! |-------------------------|---------------|-----------|---------|
//! | first_name / last_name  | permitted     | denied    | denied  |
//!
//! Password changes are not role-gated; they are governed by the old-password
//! proof in the profile handler. All edits target the caller's own record.

use crate::accounts::Role;

/// The profile fields the policy ranges over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
}

/// Stateless and role-driven: may `role` edit `field` on its own record?
pub fn field_edit_allowed(role: Role, field: ProfileField) -> bool {
    match field {
        ProfileField::FirstName | ProfileField::LastName => role.is_administrator(),
    }
}

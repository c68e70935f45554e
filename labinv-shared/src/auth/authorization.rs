/// Role-based authorization
///
/// Every protected operation declares the set of roles allowed to run it.
/// The check is a plain membership test; roles are not hierarchical, so an
/// operation open to ADMIN and ASISTENTE is closed to AUDITOR.
///
/// # Permission Matrix
///
/// | Operation | Allowed |
/// |---|---|
/// | register / list / update / delete users | [`RoleSet::ADMIN`] |
/// | list / search / export instruments | [`RoleSet::ANY`] |
/// | create / update / import instruments | [`RoleSet::EDITORS`] |
/// | delete instruments | [`RoleSet::ADMIN`] |

use super::session::SessionUser;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthzError {
    /// The session's role is not in the allowed set
    #[error("Role {actual} is not allowed (requires one of {allowed})")]
    RoleNotAllowed { actual: Role, allowed: RoleSet },
}

/// A set of roles allowed to perform an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleSet {
    roles: &'static [Role],
}

impl RoleSet {
    /// ADMIN only
    pub const ADMIN: RoleSet = RoleSet::new(&[Role::Admin]);

    /// ADMIN and ASISTENTE
    pub const EDITORS: RoleSet = RoleSet::new(&[Role::Admin, Role::Asistente]);

    /// Every authenticated role
    pub const ANY: RoleSet = RoleSet::new(&Role::ALL);

    /// Creates a set from a static list of roles
    pub const fn new(roles: &'static [Role]) -> Self {
        Self { roles }
    }

    /// Whether `role` belongs to the set
    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// The roles in the set
    pub fn roles(&self) -> &'static [Role] {
        self.roles
    }
}

impl std::fmt::Display for RoleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.roles.iter().map(Role::as_str).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

/// Checks that the session's role belongs to `allowed`
///
/// # Errors
///
/// Returns `AuthzError::RoleNotAllowed` when it doesn't
pub fn authorize(user: &SessionUser, allowed: RoleSet) -> Result<(), AuthzError> {
    if !allowed.contains(user.rol) {
        return Err(AuthzError::RoleNotAllowed {
            actual: user.rol,
            allowed,
        });
    }

    Ok(())
}

/// Session identity
///
/// The reduced projection of a user that is kept server-side for the
/// lifetime of a login. It is serialized into the session store under
/// [`SESSION_USER_KEY`] and never written to the database.

use serde::{Deserialize, Serialize};

use crate::models::user::{Role, User};

/// Session key under which the authenticated identity is stored
pub const SESSION_USER_KEY: &str = "usuario";

/// Authenticated identity attached to a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i32,
    pub correo: String,
    pub rol: Role,
}

impl From<&User> for SessionUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            correo: user.correo.clone(),
            rol: user.rol,
        }
    }
}

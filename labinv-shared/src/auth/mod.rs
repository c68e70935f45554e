/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: the identity stored in a login session
/// - [`authorization`]: role sets and the role membership check
///
/// Session storage itself belongs to the HTTP layer; this module only
/// defines what is stored and how it is checked.

pub mod authorization;
pub mod password;
pub mod session;

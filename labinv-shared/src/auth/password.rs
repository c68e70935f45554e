/// Password hashing with Argon2id
///
/// Staff passwords are stored as Argon2id PHC strings. Every hash produced
/// here uses the same fixed cost; verification reads the parameters embedded
/// in the stored string, so hashes created with other costs still verify.
///
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$<salt>$<hash>
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, ParamsBuilder, Version,
};

/// Memory cost in KiB (64 MB)
pub const MEMORY_COST_KIB: u32 = 65536;

/// Number of passes
pub const TIME_COST: u32 = 3;

/// Parallel lanes
pub const PARALLELISM: u32 = 4;

const OUTPUT_LEN: usize = 32;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The hashing engine failed while verifying
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored hash is not a valid PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(MEMORY_COST_KIB)
        .t_cost(TIME_COST)
        .p_cost(PARALLELISM)
        .output_len(OUTPUT_LEN)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password with a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verifies a plaintext password against a stored PHC hash
///
/// # Returns
///
/// `Ok(true)` on match, `Ok(false)` on mismatch
///
/// # Errors
///
/// Returns `InvalidHash` if the stored value can't be parsed and
/// `VerifyError` for any other engine failure.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Returns the password only when it has non-whitespace content
///
/// Used by the user update flow: a blank password means "keep the current
/// hash".
pub fn non_blank(password: Option<&str>) -> Option<&str> {
    password.filter(|p| !p.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embeds_fixed_cost() {
        let hash = hash_password("clave-segura").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$v=19$"));
        assert!(hash.contains("m=65536,t=3,p=4"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("repetida").unwrap();
        let second = hash_password("repetida").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_match_and_mismatch() {
        let hash = hash_password("correcta").unwrap();

        assert!(verify_password("correcta", &hash).unwrap());
        assert!(!verify_password("incorrecta", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(verify_password("x", "$argon2id$broken").is_err());
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("nueva")), Some("nueva"));
        assert_eq!(non_blank(Some(" nueva ")), Some(" nueva "));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(Some("")), None);
        assert_eq!(non_blank(None), None);
    }
}

/// Password hashing using Argon2id
///
/// Hashes are PHC strings carrying their own salt and parameters;
/// verification is constant-time inside the argon2 crate.
use crate::error::{ConsoleError, ConsoleResult};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str) -> ConsoleResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ConsoleError::Internal(format!("Password hashing failed: {}", e)))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored hash.
/// A wrong password is `false`; a malformed stored hash is also `false`
/// so that login failures stay indistinguishable to the caller.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("editorial-Desk1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("editorial-Desk1", &hash));
        assert!(!verify_password("editorial-Desk2", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_malformed_hash_is_false() {
        assert!(!verify_password("anything", "not-a-phc-string"));
    }
}

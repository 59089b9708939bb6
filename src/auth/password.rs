/// Password Hashing and Verification
///
/// Argon2id with a fresh random salt per hash. Output is a self-describing
/// PHC string, so parameters can change without invalidating stored hashes.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AuthError;

/// Hash a password using Argon2id
///
/// # Errors
/// Returns `AuthError::Hashing` if salt generation or hashing fails
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Verify a password against a PHC-encoded hash
///
/// A well-formed hash that does not match yields `Ok(false)`.
///
/// # Errors
/// Returns `AuthError::Hashing` if the stored hash cannot be decoded
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AuthError::Hashing(format!("invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::Hashing(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password() {
        let password = "password123";
        let hash = hash_password(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("password123").expect("Failed to hash password");

        assert!(verify_password("password123", &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = hash_password("seasame456").expect("Failed to hash password");

        let is_valid = verify_password("password123", &hash).expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_same_password_different_salt() {
        let first = hash_password("password123").unwrap();
        let second = hash_password("password123").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("password123", &first).unwrap());
        assert!(verify_password("password123", &second).unwrap());
    }

    #[test]
    fn test_empty_password_is_hashed() {
        let hash = hash_password("").expect("Failed to hash empty password");

        assert!(verify_password("", &hash).unwrap());
        assert!(!verify_password("x", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash() {
        let result = verify_password("password123", "not-a-phc-string");
        assert!(matches!(result, Err(AuthError::Hashing(_))));
    }
}

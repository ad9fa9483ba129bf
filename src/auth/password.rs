/// Password hashing and verification using Argon2id
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};

use once_cell::sync::OnceCell;

use crate::error::ApiError;

// 未登録メール用の検証対象。初回利用時に一度だけ生成する
static DUMMY_HASH: OnceCell<String> = OnceCell::new();

/// Hash a password using Argon2id.
/// Returns the PHC string suitable for storage in the `users` table.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut rand::thread_rng());

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Failed to hash password: {}", e)))?
        .to_string();

    Ok(password_hash)
}

/// Verify a password against a stored hash.
/// Returns `Ok(false)` on mismatch; a malformed stored hash is an internal error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, ApiError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("Invalid password hash format: {}", e)))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Run a full Argon2 verification against a throwaway hash.
/// Login calls this for unknown emails so both failure paths cost the same.
pub fn verify_against_dummy(password: &str) -> Result<(), ApiError> {
    let hash = DUMMY_HASH.get_or_try_init(|| hash_password("unused-account-placeholder-1"))?;
    verify_password(password, hash)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "titanic1997";
        let hash = hash_password(password).unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_wrong_password() {
        let hash = hash_password("titanic1997").unwrap();
        assert!(!verify_password("inception2010", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let first = hash_password("titanic1997").unwrap();
        let second = hash_password("titanic1997").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_malformed_hash() {
        assert!(verify_password("titanic1997", "plaintext").is_err());
    }

    #[test]
    fn test_dummy_verification_reuses_one_hash() {
        assert!(verify_against_dummy("whatever1").is_ok());
        let first = DUMMY_HASH.get().cloned().unwrap();

        assert!(verify_against_dummy("something-else2").is_ok());
        assert_eq!(DUMMY_HASH.get().unwrap(), &first);
        assert!(first.starts_with("$argon2id$"));
    }
}

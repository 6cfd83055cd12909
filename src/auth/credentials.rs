use argon2::{
    password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand::rngs::OsRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("could not hash password: {0}")]
    Hash(password_hash::Error),
    #[error("stored password hash is unusable: {0}")]
    StoredHash(password_hash::Error),
}

/// One-way transform for user passwords. Digests are PHC strings, so
/// each one carries its own salt and Argon2 parameters.
#[derive(Clone, Default)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    pub fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2
            .hash_password(plain.as_bytes(), &salt)
            .map_err(CredentialError::Hash)?;
        Ok(digest.to_string())
    }

    /// `Ok(false)` when the password does not match. Errors mean the stored
    /// digest itself cannot be checked.
    pub fn verify(&self, plain: &str, stored: &str) -> Result<bool, CredentialError> {
        let parsed = PasswordHash::new(stored).map_err(CredentialError::StoredHash)?;
        match self.argon2.verify_password(plain.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(CredentialError::StoredHash(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use argon2::{Algorithm, Params, Version};

    #[test]
    fn digest_is_salted_argon2id_without_plaintext() {
        let hasher = CredentialHasher::default();
        let digest = hasher.hash("p1").unwrap();
        let parsed = PasswordHash::new(&digest).expect("phc string");
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert!(parsed.salt.is_some());
        assert!(!digest.contains("p1"));
    }

    #[test]
    fn signup_password_verifies_and_others_do_not() {
        let hasher = CredentialHasher::default();
        let digest = hasher.hash("p1").unwrap();
        assert!(hasher.verify("p1", &digest).unwrap());
        assert!(!hasher.verify("p2", &digest).unwrap());
        assert!(!hasher.verify("", &digest).unwrap());
    }

    #[test]
    fn repeated_hashing_never_repeats_a_digest() {
        let hasher = CredentialHasher::default();
        assert_ne!(hasher.hash("p1").unwrap(), hasher.hash("p1").unwrap());
    }

    #[test]
    fn digests_made_with_other_params_still_verify() {
        let cheap = Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            Params::new(8 * 1024, 1, 1, None).unwrap(),
        );
        let salt = SaltString::generate(&mut OsRng);
        let digest = cheap.hash_password(b"legacy", &salt).unwrap().to_string();

        let hasher = CredentialHasher::default();
        assert!(hasher.verify("legacy", &digest).unwrap());
        assert!(!hasher.verify("other", &digest).unwrap());
    }

    #[test]
    fn corrupt_stored_digest_is_an_error_not_a_mismatch() {
        let hasher = CredentialHasher::default();
        for stored in ["", "plaintext-password", "argon2id$missing-leading-dollar"] {
            let err = hasher.verify("p1", stored).unwrap_err();
            assert!(matches!(err, CredentialError::StoredHash(_)), "stored {stored:?}");
        }
    }
}

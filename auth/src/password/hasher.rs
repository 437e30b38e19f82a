use hmac::Hmac;
use hmac::Mac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha512;
use subtle::ConstantTimeEq;

use super::credential::Credential;
use super::errors::PasswordError;

type HmacSha512 = Hmac<Sha512>;

/// Password hashing implementation.
///
/// Produces a salted keyed digest: HMAC-SHA512 over the UTF-8 password,
/// keyed by a random per-credential salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hash a plaintext password with a freshly generated salt.
    ///
    /// Two calls with the same password never share a salt, so their
    /// digests differ as well.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to hash
    ///
    /// # Returns
    /// Credential holding the digest and the salt used as HMAC key
    ///
    /// # Errors
    /// * `EmptyPassword` - Password is empty
    /// * `HashingFailed` - HMAC could not be keyed
    pub fn hash(&self, password: &str) -> Result<Credential, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let mut salt = vec![0u8; Credential::SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        let hash = digest(password, &salt)?;

        Ok(Credential::new(hash, salt))
    }

    /// Verify a password against a stored credential.
    ///
    /// The digest comparison runs in constant time over the stored hash.
    /// A length mismatch is reported as a non-match.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `credential` - Stored hash and salt
    ///
    /// # Returns
    /// True only if the recomputed digest equals the stored one
    pub fn verify(&self, password: &str, credential: &Credential) -> bool {
        if password.is_empty() || credential.salt().is_empty() || credential.hash().is_empty() {
            return false;
        }

        match digest(password, credential.salt()) {
            Ok(computed) => computed.as_slice().ct_eq(credential.hash()).into(),
            Err(_) => false,
        }
    }
}

fn digest(password: &str, salt: &[u8]) -> Result<Vec<u8>, PasswordError> {
    let mut mac = HmacSha512::new_from_slice(salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
    mac.update(password.as_bytes());

    Ok(mac.finalize().into_bytes().to_vec())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let credential = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(password, &credential));
        assert!(!hasher.verify("wrong_password", &credential));
    }

    #[test]
    fn test_hash_lengths() {
        let hasher = PasswordHasher::new();
        let credential = hasher.hash("password123").expect("Failed to hash password");

        assert_eq!(credential.hash().len(), Credential::HASH_LEN);
        assert_eq!(credential.salt().len(), Credential::SALT_LEN);
    }

    #[test]
    fn test_same_password_yields_distinct_credentials() {
        let hasher = PasswordHasher::new();

        let first = hasher.hash("same_password").expect("Failed to hash password");
        let second = hasher.hash("same_password").expect("Failed to hash password");

        assert_ne!(first.salt(), second.salt());
        assert_ne!(first.hash(), second.hash());
        assert!(hasher.verify("same_password", &first));
        assert!(hasher.verify("same_password", &second));
    }

    #[test]
    fn test_hash_rejects_empty_password() {
        let hasher = PasswordHasher::new();
        assert!(matches!(hasher.hash(""), Err(PasswordError::EmptyPassword)));
    }

    #[test]
    fn test_verify_is_case_and_whitespace_sensitive() {
        let hasher = PasswordHasher::new();
        let credential = hasher.hash("Secret").expect("Failed to hash password");

        assert!(!hasher.verify("secret", &credential));
        assert!(!hasher.verify("Secret ", &credential));
        assert!(!hasher.verify("", &credential));
    }

    #[test]
    fn test_verify_unicode_password() {
        let hasher = PasswordHasher::new();
        let credential = hasher.hash("sênha-ção-🔑").expect("Failed to hash password");

        assert!(hasher.verify("sênha-ção-🔑", &credential));
        assert!(!hasher.verify("senha-cao-🔑", &credential));
    }

    #[test]
    fn test_verify_truncated_hash_fails() {
        let hasher = PasswordHasher::new();
        let credential = hasher.hash("password123").expect("Failed to hash password");

        let truncated = Credential::from_parts(
            credential.hash()[..32].to_vec(),
            credential.salt().to_vec(),
        )
        .expect("non-empty parts");

        assert!(!hasher.verify("password123", &truncated));
    }

    #[test]
    fn test_verify_with_foreign_salt_fails() {
        let hasher = PasswordHasher::new();
        let alice = hasher.hash("password123").expect("Failed to hash password");
        let bob = hasher.hash("password123").expect("Failed to hash password");

        let mixed = Credential::from_parts(alice.hash().to_vec(), bob.salt().to_vec())
            .expect("non-empty parts");

        assert!(!hasher.verify("password123", &mixed));
    }

    fn time_verifications(
        hasher: &PasswordHasher,
        credential: &Credential,
        rounds: u32,
    ) -> Duration {
        let start = Instant::now();
        for _ in 0..rounds {
            std::hint::black_box(hasher.verify("password123", credential));
        }
        start.elapsed()
    }

    // Statistical and machine dependent; run with `cargo test -- --ignored`.
    #[test]
    #[ignore]
    fn test_verify_timing_does_not_depend_on_mismatch_position() {
        let hasher = PasswordHasher::new();
        let credential = hasher.hash("password123").expect("Failed to hash password");

        let mut near = credential.hash().to_vec();
        let last = near.len() - 1;
        near[last] ^= 0x01;
        let near_match =
            Credential::from_parts(near, credential.salt().to_vec()).expect("non-empty parts");

        let far = credential.hash().iter().map(|b| !b).collect::<Vec<u8>>();
        let full_mismatch =
            Credential::from_parts(far, credential.salt().to_vec()).expect("non-empty parts");

        let rounds = 20_000;
        let _ = time_verifications(&hasher, &near_match, rounds);
        let near_elapsed = time_verifications(&hasher, &near_match, rounds);
        let far_elapsed = time_verifications(&hasher, &full_mismatch, rounds);

        let ratio = near_elapsed.as_secs_f64() / far_elapsed.as_secs_f64();
        assert!(
            (0.75..1.33).contains(&ratio),
            "timing ratio {ratio} suggests early exit"
        );
    }
}

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

/// Salted password digest as persisted alongside a user record.
///
/// Both halves are always present together and never empty.
#[derive(Clone)]
pub struct Credential {
    hash: Vec<u8>,
    salt: Vec<u8>,
}

impl Credential {
    /// Salt length in bytes (size of a fresh HMAC-SHA512 key).
    pub const SALT_LEN: usize = 128;

    /// Digest length in bytes (SHA-512 output).
    pub const HASH_LEN: usize = 64;

    pub(crate) fn new(hash: Vec<u8>, salt: Vec<u8>) -> Self {
        Self { hash, salt }
    }

    /// Full-size credential that no password matches.
    ///
    /// Verifying against it costs the same as verifying against a real one.
    pub(crate) fn decoy() -> Self {
        let mut salt = vec![0u8; Self::SALT_LEN];
        OsRng.fill_bytes(&mut salt);

        Self::new(vec![0u8; Self::HASH_LEN], salt)
    }

    /// Rebuild a credential from a stored `(hash, salt)` pair.
    ///
    /// # Returns
    /// `None` if either half is empty
    pub fn from_parts(hash: Vec<u8>, salt: Vec<u8>) -> Option<Self> {
        if hash.is_empty() || salt.is_empty() {
            return None;
        }
        Some(Self { hash, salt })
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    /// Split into the `(hash, salt)` pair for storage.
    pub fn into_parts(self) -> (Vec<u8>, Vec<u8>) {
        (self.hash, self.salt)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("hash", &format_args!("<{} bytes>", self.hash.len()))
            .field("salt", &format_args!("<{} bytes>", self.salt.len()))
            .finish()
    }
}

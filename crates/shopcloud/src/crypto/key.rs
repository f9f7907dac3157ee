//! [`SecretKey`]: the content-encryption key derived from a shop secret.

use zeroize::Zeroize;

use super::cipher::{CipherError, KEY_LEN};

/// Optional prefix on shop secrets as they are issued to partners.
pub const SECRET_PREFIX: &str = "sk_";

/// Strip the optional [`SECRET_PREFIX`] from a shop secret.
///
/// Only a single leading prefix is removed; the rest of the string is the
/// key material.
pub fn normalize_secret(secret: &str) -> &str {
    secret.strip_prefix(SECRET_PREFIX).unwrap_or(secret)
}

/// AES-128 key material of exactly [`KEY_LEN`] bytes.
///
/// The memory is overwritten with zeroes on drop.
pub struct SecretKey(Box<[u8; KEY_LEN]>);

impl SecretKey {
    /// Import raw key bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if `raw` is not [`KEY_LEN`] bytes.
    pub fn import(raw: &[u8]) -> Result<Self, CipherError> {
        if raw.len() != KEY_LEN {
            return Err(CipherError::InvalidKeyLength(raw.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(raw);
        Ok(Self(buf))
    }

    /// Derive the key from a shop secret: normalise it, then use its UTF-8
    /// bytes directly as key material.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKeyLength`] if the normalised secret is not
    /// [`KEY_LEN`] bytes long.
    pub fn from_secret(secret: &str) -> Result<Self, CipherError> {
        Self::import(normalize_secret(secret).as_bytes())
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    fn wipe(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key bytes stay out of every log line.
        f.write_str("SecretKey([REDACTED])")
    }
}

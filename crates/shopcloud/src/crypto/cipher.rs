//! AES-128-GCM sealing and opening with additional authenticated data.
//!
//! A fresh 96-bit IV is drawn from the OS CSPRNG for every seal. GCM nonce
//! reuse under one key breaks both confidentiality and authentication, so the
//! IV is never caller-supplied on the encrypt path.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng, Payload},
    Aes128Gcm, Nonce,
};
use thiserror::Error;

use super::key::SecretKey;

/// Byte length of an AES-128 key (16 bytes = 128 bits).
pub const KEY_LEN: usize = 16;

/// Byte length of an AES-GCM IV (12 bytes = 96 bits).
pub const IV_LEN: usize = 12;

/// Byte length of an AES-GCM authentication tag.
pub const TAG_LEN: usize = 16;

/// Output of a single AES-GCM seal, with the tag split from the ciphertext
/// the way JWE carries them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sealed {
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The key material is the wrong length.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidKeyLength(usize),

    /// AES-GCM encryption or authentication failed.
    #[error("aead operation failed")]
    AeadFailure,

    /// The compact token does not match the expected structure.
    #[error("invalid compact encoding: {0}")]
    InvalidFormat(&'static str),

    /// The protected header names an algorithm this codec does not speak.
    #[error("unsupported algorithm: alg={alg}, enc={enc}")]
    UnsupportedAlgorithm { alg: String, enc: String },
}

/// Encrypt `plaintext` under `key`, authenticating `aad` alongside it.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable with a valid key).
pub fn seal(plaintext: &[u8], aad: &[u8], key: &SecretKey) -> Result<Sealed, CipherError> {
    let cipher = build_cipher(key)?;

    use aes_gcm::aead::rand_core::RngCore;
    let mut iv = [0u8; IV_LEN];
    OsRng.fill_bytes(&mut iv);

    let mut ciphertext = cipher
        .encrypt(Nonce::from_slice(&iv), Payload { msg: plaintext, aad })
        .map_err(|_| CipherError::AeadFailure)?;

    // aes-gcm appends the tag to the ciphertext.
    let split = ciphertext
        .len()
        .checked_sub(TAG_LEN)
        .ok_or(CipherError::AeadFailure)?;
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&ciphertext[split..]);
    ciphertext.truncate(split);

    Ok(Sealed {
        iv,
        ciphertext,
        tag,
    })
}

/// Decrypt and authenticate a [`Sealed`] value.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if authentication fails (wrong key,
/// tampered ciphertext, tag, IV, or AAD).
pub fn open(sealed: &Sealed, aad: &[u8], key: &SecretKey) -> Result<Vec<u8>, CipherError> {
    let cipher = build_cipher(key)?;

    let mut msg = Vec::with_capacity(sealed.ciphertext.len() + TAG_LEN);
    msg.extend_from_slice(&sealed.ciphertext);
    msg.extend_from_slice(&sealed.tag);

    cipher
        .decrypt(Nonce::from_slice(&sealed.iv), Payload { msg: msg.as_slice(), aad })
        .map_err(|_| CipherError::AeadFailure)
}

fn build_cipher(key: &SecretKey) -> Result<Aes128Gcm, CipherError> {
    let bytes = key.as_bytes();
    Aes128Gcm::new_from_slice(bytes).map_err(|_| CipherError::InvalidKeyLength(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn random_key() -> SecretKey {
        use aes_gcm::aead::rand_core::RngCore;
        let mut raw = [0u8; KEY_LEN];
        OsRng.fill_bytes(&mut raw);
        SecretKey::import(&raw).unwrap()
    }

    #[test]
    fn seal_open_round_trip() {
        let key = random_key();
        let sealed = seal(b"{\"type\":\"partner\"}", b"header", &key).unwrap();
        assert_eq!(sealed.ciphertext.len(), 18);
        let opened = open(&sealed, b"header", &key).unwrap();
        assert_eq!(opened, b"{\"type\":\"partner\"}");
    }

    #[test]
    fn fresh_iv_per_seal() {
        let key = random_key();
        let a = seal(b"same", b"", &key).unwrap();
        let b = seal(b"same", b"", &key).unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn wrong_key_fails() {
        let sealed = seal(b"secret", b"", &random_key()).unwrap();
        assert!(matches!(
            open(&sealed, b"", &random_key()),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn aad_is_authenticated() {
        let key = random_key();
        let sealed = seal(b"secret", b"header-a", &key).unwrap();
        assert!(open(&sealed, b"header-b", &key).is_err());
    }

    #[test]
    fn tampered_tag_fails_auth() {
        let key = random_key();
        let mut sealed = seal(b"tamper me", b"", &key).unwrap();
        sealed.tag[0] ^= 0xFF;
        assert!(open(&sealed, b"", &key).is_err());
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let key = random_key();
        let mut sealed = seal(b"tamper me", b"", &key).unwrap();
        sealed.ciphertext[0] ^= 0xFF;
        assert!(open(&sealed, b"", &key).is_err());
    }
}

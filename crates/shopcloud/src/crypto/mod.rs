//! AES-128-GCM token encryption primitives.
//!
//! This module knows nothing about payloads or shops. It turns bytes into a
//! JWE compact string (RFC 7516) and back, using direct symmetric key use.
//!
//! # Ciphertext format
//!
//! ```text
//! <b64(header)>..<b64(iv)>.<b64(ciphertext)>.<b64(tag)>
//! ```
//!
//! The protected header is `{"alg":"dir","enc":"A128GCM"}`; the encrypted-key
//! segment is empty because the shared secret is the content-encryption key.
//! Base64url has no `@`, so the shop suffix separator never collides.

pub mod cipher;
pub mod jwe;
pub mod key;

pub use cipher::{CipherError, KEY_LEN};
pub use key::{normalize_secret, SecretKey};

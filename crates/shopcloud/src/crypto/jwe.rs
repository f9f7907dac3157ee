//! JWE compact serialisation for `alg=dir`, `enc=A128GCM`.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use super::cipher::{self, CipherError, Sealed, IV_LEN, TAG_LEN};
use super::key::SecretKey;

/// Key management algorithm: the shared key is the content-encryption key.
pub const ALG_DIR: &str = "dir";

/// Content encryption: AES-GCM with a 128-bit key.
pub const ENC_A128GCM: &str = "A128GCM";

/// JWE protected header. Serialises as `{"alg":"dir","enc":"A128GCM"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedHeader {
    pub alg: String,
    pub enc: String,
}

impl ProtectedHeader {
    /// The only header this module issues or accepts.
    pub fn dir_a128gcm() -> Self {
        Self {
            alg: ALG_DIR.into(),
            enc: ENC_A128GCM.into(),
        }
    }

    fn is_supported(&self) -> bool {
        self.alg == ALG_DIR && self.enc == ENC_A128GCM
    }
}

/// A parsed compact JWE.
///
/// `encoded_header` is kept as it appeared on the wire because its ASCII
/// bytes are the additional authenticated data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactJwe {
    pub encoded_header: String,
    pub sealed: Sealed,
}

impl CompactJwe {
    /// Encode to `header..iv.ciphertext.tag`.
    pub fn to_compact(&self) -> String {
        format!(
            "{}..{}.{}.{}",
            self.encoded_header,
            URL_SAFE_NO_PAD.encode(self.sealed.iv),
            URL_SAFE_NO_PAD.encode(&self.sealed.ciphertext),
            URL_SAFE_NO_PAD.encode(self.sealed.tag),
        )
    }

    /// Parse a compact JWE string.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidFormat`] if the string does not have five
    /// segments, carries an encrypted key, or has undecodable or wrongly sized
    /// segments. Returns [`CipherError::UnsupportedAlgorithm`] if the header
    /// names anything other than `dir` / `A128GCM`.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let parts: Vec<&str> = s.split('.').collect();
        let [header, encrypted_key, iv, ciphertext, tag] = parts.as_slice() else {
            return Err(CipherError::InvalidFormat("expected five segments"));
        };
        if !encrypted_key.is_empty() {
            return Err(CipherError::InvalidFormat(
                "encrypted key must be empty for direct encryption",
            ));
        }

        let header_json = decode(header, "header is not base64url")?;
        let parsed: ProtectedHeader = serde_json::from_slice(&header_json)
            .map_err(|_| CipherError::InvalidFormat("header is not a JWE header"))?;
        if !parsed.is_supported() {
            return Err(CipherError::UnsupportedAlgorithm {
                alg: parsed.alg,
                enc: parsed.enc,
            });
        }

        let iv = decode(iv, "iv is not base64url")?;
        let iv: [u8; IV_LEN] = iv
            .try_into()
            .map_err(|_| CipherError::InvalidFormat("iv has wrong length"))?;
        let tag = decode(tag, "tag is not base64url")?;
        let tag: [u8; TAG_LEN] = tag
            .try_into()
            .map_err(|_| CipherError::InvalidFormat("tag has wrong length"))?;
        let ciphertext = decode(ciphertext, "ciphertext is not base64url")?;

        Ok(Self {
            encoded_header: (*header).to_owned(),
            sealed: Sealed {
                iv,
                ciphertext,
                tag,
            },
        })
    }
}

/// Encrypt `plaintext` into a compact JWE string.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] if the AEAD primitive fails.
pub fn encrypt(plaintext: &[u8], key: &SecretKey) -> Result<String, CipherError> {
    let header = serde_json::to_vec(&ProtectedHeader::dir_a128gcm())
        .map_err(|_| CipherError::InvalidFormat("header does not serialise"))?;
    let encoded_header = URL_SAFE_NO_PAD.encode(header);
    let sealed = cipher::seal(plaintext, encoded_header.as_bytes(), key)?;
    Ok(CompactJwe {
        encoded_header,
        sealed,
    }
    .to_compact())
}

/// Decrypt a compact JWE string back to plaintext bytes.
///
/// # Errors
///
/// Returns any [`CompactJwe::parse`] error, or [`CipherError::AeadFailure`]
/// if authentication fails.
pub fn decrypt(compact: &str, key: &SecretKey) -> Result<Vec<u8>, CipherError> {
    let jwe = CompactJwe::parse(compact)?;
    cipher::open(&jwe.sealed, jwe.encoded_header.as_bytes(), key)
}

fn decode(segment: &str, what: &'static str) -> Result<Vec<u8>, CipherError> {
    URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|_| CipherError::InvalidFormat(what))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENCODED_HEADER: &str = "eyJhbGciOiJkaXIiLCJlbmMiOiJBMTI4R0NNIn0";

    // Produced by an independent AES-GCM implementation with an all-counting IV.
    const KNOWN_TOKEN: &str = "eyJhbGciOiJkaXIiLCJlbmMiOiJBMTI4R0NNIn0..AAECAwQFBgcICQoL.\
                               mNc5i1EbS_QAkaBnbWIrbLAaaQEjc2KBagcCUMPOZEDSEgj1smG3.\
                               gyBDxDwIIEPCT_5iVWW4Sw";

    fn key() -> SecretKey {
        SecretKey::from_secret("sk_61c394cf3346077b").unwrap()
    }

    #[test]
    fn header_encoding_is_canonical() {
        let header = serde_json::to_string(&ProtectedHeader::dir_a128gcm()).unwrap();
        assert_eq!(header, r#"{"alg":"dir","enc":"A128GCM"}"#);
        let token = encrypt(b"{}", &key()).unwrap();
        assert!(token.starts_with(&format!("{ENCODED_HEADER}..")));
    }

    #[test]
    fn compact_has_five_segments_and_no_at_sign() {
        let token = encrypt(b"{\"user_data\":{}}", &key()).unwrap();
        assert_eq!(token.split('.').count(), 5);
        assert!(!token.contains('@'));
    }

    #[test]
    fn decrypts_known_token() {
        let plaintext = decrypt(KNOWN_TOKEN, &key()).unwrap();
        assert_eq!(plaintext, br#"{"type":"partner","expires":1767272400}"#);
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let token = encrypt(b"hello", &key()).unwrap();
        assert_eq!(decrypt(&token, &key()).unwrap(), b"hello");
    }

    #[test]
    fn wrong_key_fails() {
        let other = SecretKey::from_secret("ffffffffffffffff").unwrap();
        assert!(matches!(
            decrypt(KNOWN_TOKEN, &other),
            Err(CipherError::AeadFailure)
        ));
    }

    #[test]
    fn rejects_too_few_segments() {
        assert!(matches!(
            decrypt("abc.def", &key()),
            Err(CipherError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_encrypted_key_segment() {
        let token = KNOWN_TOKEN.replacen("..", ".AAAA.", 1);
        assert!(matches!(
            decrypt(&token, &key()),
            Err(CipherError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_unsupported_algorithm() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"dir","enc":"A256GCM"}"#);
        let token = KNOWN_TOKEN.replacen(ENCODED_HEADER, &header, 1);
        assert!(matches!(
            decrypt(&token, &key()),
            Err(CipherError::UnsupportedAlgorithm { .. })
        ));
    }

    #[test]
    fn rejects_bad_base64() {
        let token = format!("{ENCODED_HEADER}..!!!.abc.def");
        assert!(matches!(
            decrypt(&token, &key()),
            Err(CipherError::InvalidFormat(_))
        ));
    }

    #[test]
    fn rejects_truncated_tag() {
        let token = KNOWN_TOKEN.rsplit_once('.').unwrap().0.to_owned() + ".gyBDxDwI";
        assert!(matches!(
            decrypt(&token, &key()),
            Err(CipherError::InvalidFormat(_))
        ));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let jwe = CompactJwe::parse(KNOWN_TOKEN).unwrap();
        let mut tampered = jwe.clone();
        tampered.sealed.ciphertext[0] ^= 0x01;
        assert!(decrypt(&tampered.to_compact(), &key()).is_err());
        assert_eq!(CompactJwe::parse(&jwe.to_compact()).unwrap(), jwe);
    }
}

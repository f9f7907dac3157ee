//! [`TokenCodec`]: payload serialisation plus JWE encryption under a shop key.

use shopcloud_common::{Payload, ShopCloudError};

use crate::crypto::{jwe, CipherError, SecretKey};

/// Encrypts payloads into compact JWE strings and back.
///
/// The key is derived once at construction and never leaves the codec.
#[derive(Debug)]
pub struct TokenCodec {
    key: SecretKey,
}

impl TokenCodec {
    /// Derive the content-encryption key from a shop secret.
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::InvalidKey`] if the normalised secret is not
    /// usable as an AES-128 key.
    pub fn new(secret: &str) -> Result<Self, ShopCloudError> {
        let key =
            SecretKey::from_secret(secret).map_err(|e| ShopCloudError::InvalidKey(e.to_string()))?;
        Ok(Self { key })
    }

    /// Serialise `payload` as JSON and encrypt it.
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::Serialization`] if the payload does not
    /// serialise, or [`ShopCloudError::Decryption`] if the AEAD layer fails.
    pub fn encrypt(&self, payload: &Payload) -> Result<String, ShopCloudError> {
        let plaintext = serde_json::to_vec(payload)?;
        jwe::encrypt(&plaintext, &self.key).map_err(to_service_error)
    }

    /// Decrypt a compact JWE string and parse the plaintext as a [`Payload`].
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::Decryption`] if the ciphertext is malformed,
    /// fails authentication, or does not contain a payload.
    pub fn decrypt(&self, ciphertext: &str) -> Result<Payload, ShopCloudError> {
        let plaintext = jwe::decrypt(ciphertext, &self.key).map_err(to_service_error)?;
        serde_json::from_slice(&plaintext)
            .map_err(|e| ShopCloudError::Decryption(format!("plaintext is not a payload: {e}")))
    }
}

fn to_service_error(e: CipherError) -> ShopCloudError {
    match e {
        CipherError::InvalidKeyLength(_) => ShopCloudError::InvalidKey(e.to_string()),
        _ => ShopCloudError::Decryption(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopcloud_common::{GroupData, PersonData};

    const SECRET: &str = "sk_61c394cf3346077b";

    fn payload() -> Payload {
        Payload {
            user_data: Some(PersonData {
                id: Some("19850703".into()),
                name: Some("Emmett Brown".into()),
                email: Some("ebrown@time.com".into()),
                country: Some("USA".into()),
                ..PersonData::default()
            }),
            group_data: Some(GroupData {
                name: Some("Marty McFly".into()),
                player_number: None,
                ..GroupData::default()
            }),
            ..Payload::default()
        }
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let ciphertext = codec.encrypt(&payload()).unwrap();
        assert_eq!(codec.decrypt(&ciphertext).unwrap(), payload());
    }

    #[test]
    fn ciphertext_hides_payload() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let ciphertext = codec.encrypt(&payload()).unwrap();
        assert!(!ciphertext.contains("Emmett"));
    }

    #[test]
    fn invalid_secret_rejected() {
        let err = TokenCodec::new("sk_tooshort").unwrap_err();
        assert_eq!(err.code(), "invalid_key");
    }

    #[test]
    fn other_secret_cannot_decrypt() {
        let ciphertext = TokenCodec::new(SECRET).unwrap().encrypt(&payload()).unwrap();
        let other = TokenCodec::new("sk_0000000000000000").unwrap();
        let err = other.decrypt(&ciphertext).unwrap_err();
        assert_eq!(err.code(), "decryption_error");
    }

    #[test]
    fn garbage_ciphertext_is_decryption_error() {
        let codec = TokenCodec::new(SECRET).unwrap();
        assert!(matches!(
            codec.decrypt("not-a-token"),
            Err(ShopCloudError::Decryption(_))
        ));
    }

    #[test]
    fn non_payload_plaintext_is_decryption_error() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let ciphertext = jwe::encrypt(b"[1,2,3]", &codec.key).unwrap();
        assert!(matches!(
            codec.decrypt(&ciphertext),
            Err(ShopCloudError::Decryption(_))
        ));
    }
}

//! [`ShopCloud`]: validate, encrypt, and bind tokens to one shop.
//!
//! # Token format
//!
//! ```text
//! <compact JWE>@<shop id>
//! ```
//!
//! # Concurrency
//!
//! [`ShopCloud::valid_identified`] and [`ShopCloud::identified_token`] record
//! the latest validation outcome for [`ShopCloud::errors`] and therefore take
//! `&mut self`; an instance shared across tasks needs external
//! synchronisation for those calls. [`ShopCloud::validate`],
//! [`ShopCloud::partner_token`], and [`ShopCloud::read_token`] take `&self`
//! and keep no state.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use shopcloud_common::{ErrorRecord, Payload, Result, ShopCloudError};
use tracing::{debug, warn};

use crate::codec::TokenCodec;
use crate::config::ShopCloudConfig;
use crate::validator::{self, Validation};

/// Separator between the ciphertext and the shop identifier.
pub const SHOP_SEPARATOR: char = '@';

/// Lifetime written into partner tokens' `expires` field.
pub const PARTNER_TOKEN_TTL_SECS: i64 = 3600;

/// A shop instance: its identifier, its key, and the errors from its most
/// recent validation.
#[derive(Debug)]
pub struct ShopCloud {
    shop_id: String,
    codec: TokenCodec,
    errors: Vec<ErrorRecord>,
}

impl ShopCloud {
    /// Create an instance for `shop_id`, deriving its key from `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::Config`] if `shop_id` is empty or contains
    /// [`SHOP_SEPARATOR`], and [`ShopCloudError::InvalidKey`] if the secret
    /// cannot be used as a key.
    pub fn new(shop_id: impl Into<String>, secret: &str) -> Result<Self> {
        let shop_id = shop_id.into();
        if shop_id.is_empty() {
            return Err(ShopCloudError::Config("shop id must not be empty".into()));
        }
        if shop_id.contains(SHOP_SEPARATOR) {
            return Err(ShopCloudError::Config(format!(
                "shop id must not contain '{SHOP_SEPARATOR}'"
            )));
        }
        Ok(Self {
            shop_id,
            codec: TokenCodec::new(secret)?,
            errors: Vec::new(),
        })
    }

    /// Create an instance from loaded configuration.
    ///
    /// # Errors
    ///
    /// Same as [`ShopCloud::new`].
    pub fn from_config(cfg: &ShopCloudConfig) -> Result<Self> {
        Self::new(cfg.shop_id.clone(), &cfg.secret)
    }

    /// The identifier appended to every token this instance issues.
    pub fn shop_id(&self) -> &str {
        &self.shop_id
    }

    /// Validate without touching this instance's recorded errors.
    pub fn validate(&self, payload: &Payload) -> Validation {
        validator::validate(payload)
    }

    /// Validate `payload` and record the outcome for [`ShopCloud::errors`].
    pub fn valid_identified(&mut self, payload: &Payload) -> bool {
        self.record(validator::validate(payload))
    }

    /// Errors from the most recent [`ShopCloud::valid_identified`] or
    /// identified-token call.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Validate, encrypt, and bind `payload` to this shop.
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::Validation`] carrying every failed rule if the
    /// payload is invalid. Nothing is encrypted in that case.
    pub fn identified_token(&mut self, payload: &Payload) -> Result<String> {
        if !self.valid_identified(payload) {
            return Err(ShopCloudError::Validation(self.errors.clone()));
        }
        self.issue(payload)
    }

    /// Like [`ShopCloud::identified_token`] for untyped JSON, including the
    /// structural check.
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::Validation`] if the value is not an object or
    /// any rule fails.
    pub fn identified_token_value(&mut self, value: &Value) -> Result<String> {
        if !self.record(validator::validate_value(value)) {
            return Err(ShopCloudError::Validation(self.errors.clone()));
        }
        let payload = Payload::from_value(value.clone())?;
        self.issue(&payload)
    }

    /// Issue a partner token expiring [`PARTNER_TOKEN_TTL_SECS`] from now.
    ///
    /// # Errors
    ///
    /// Fails only if encryption fails.
    pub fn partner_token(&self) -> Result<String> {
        self.partner_token_at(Utc::now())
    }

    /// Issue a partner token as if the current time were `now`.
    ///
    /// The partner payload is system-generated and skips identified-payload
    /// validation.
    ///
    /// # Errors
    ///
    /// Fails only if encryption fails.
    pub fn partner_token_at(&self, now: DateTime<Utc>) -> Result<String> {
        let payload = Payload::partner(now + Duration::seconds(PARTNER_TOKEN_TTL_SECS));
        self.issue(&payload)
    }

    /// Verify the shop suffix and decrypt the token.
    ///
    /// `expires` is returned as-is and not enforced here; callers that care
    /// must check [`Payload::is_expired_at`].
    ///
    /// # Errors
    ///
    /// - [`ShopCloudError::TokenFormat`] if there is no separator or a segment is empty.
    /// - [`ShopCloudError::TokenMismatch`] if the token names another shop.
    /// - [`ShopCloudError::Decryption`] if the ciphertext does not authenticate.
    pub fn read_token(&self, token: &str) -> Result<Payload> {
        let Some((ciphertext, shop_id)) = token.split_once(SHOP_SEPARATOR) else {
            return Err(ShopCloudError::TokenFormat(format!(
                "missing '{SHOP_SEPARATOR}' separator"
            )));
        };
        if ciphertext.is_empty() || shop_id.is_empty() {
            return Err(ShopCloudError::TokenFormat("empty token segment".into()));
        }
        if shop_id != self.shop_id {
            warn!(
                shop_id = %self.shop_id,
                token_shop_id = %shop_id,
                "token issued for another shop"
            );
            return Err(ShopCloudError::TokenMismatch {
                expected: self.shop_id.clone(),
                found: shop_id.to_owned(),
            });
        }
        self.codec.decrypt(ciphertext)
    }

    fn record(&mut self, validation: Validation) -> bool {
        let valid = validation.is_valid();
        self.errors = validation.into_errors();
        if !valid {
            debug!(
                shop_id = %self.shop_id,
                errors = self.errors.len(),
                "payload failed validation"
            );
        }
        valid
    }

    fn issue(&self, payload: &Payload) -> Result<String> {
        let ciphertext = self.codec.encrypt(payload)?;
        debug!(shop_id = %self.shop_id, partner = payload.is_partner(), "token issued");
        Ok(format!("{ciphertext}{SHOP_SEPARATOR}{}", self.shop_id))
    }
}

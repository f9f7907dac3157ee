//! Configuration loading and validation for a shop instance.
//!
//! Values are read from `SHOPCLOUD_`-prefixed environment variables:
//! `SHOPCLOUD_SHOP_ID`, `SHOPCLOUD_SECRET`, and optionally
//! `SHOPCLOUD_LOG_LEVEL`.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "SHOPCLOUD";

/// Validated shop configuration.
#[derive(Clone, Deserialize)]
pub struct ShopCloudConfig {
    /// Identifier appended to every token this shop issues. **Required.**
    pub shop_id: String,

    /// Shared secret, optionally prefixed with `sk_`. **Required.**
    pub secret: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl ShopCloudConfig {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or invalid.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix(ENV_PREFIX))
            .build()
            .context("failed to build configuration from environment")?;

        let c: ShopCloudConfig = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    pub fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.shop_id, "SHOPCLOUD_SHOP_ID")?;
        ensure_non_empty(&self.secret, "SHOPCLOUD_SECRET")?;
        if self.shop_id.contains('@') {
            anyhow::bail!("SHOPCLOUD_SHOP_ID must not contain '@'");
        }
        Ok(())
    }
}

impl std::fmt::Debug for ShopCloudConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopCloudConfig")
            .field("shop_id", &self.shop_id)
            .field("secret", &"[REDACTED]")
            .field("log_level", &self.log_level)
            .finish()
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(shop_id: &str, secret: &str) -> ShopCloudConfig {
        ShopCloudConfig {
            shop_id: shop_id.into(),
            secret: secret.into(),
            log_level: default_log_level(),
        }
    }

    #[test]
    fn defaults() {
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(cfg("A2DE537C", "sk_61c394cf3346077b").validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_shop_id() {
        assert!(cfg("  ", "sk_61c394cf3346077b").validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_secret() {
        assert!(cfg("A2DE537C", "").validate().is_err());
    }

    #[test]
    fn validate_rejects_separator_in_shop_id() {
        let err = cfg("A2DE@537C", "sk_61c394cf3346077b").validate().unwrap_err();
        assert!(err.to_string().contains("'@'"));
    }

    #[test]
    fn debug_redacts_secret() {
        let out = format!("{:?}", cfg("A2DE537C", "sk_61c394cf3346077b"));
        assert!(out.contains("A2DE537C"));
        assert!(!out.contains("61c394cf3346077b"));
    }
}

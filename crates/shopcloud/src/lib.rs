//! Issue and read encrypted, shop-bound identity tokens.
//!
//! Issue path: payload → [`validator`] → [`TokenCodec`] → `"@<shop id>"`.
//! Read path: split the shop suffix, check it, then decrypt.
//!
//! ```no_run
//! use shopcloud::{Payload, ShopCloud};
//!
//! # fn main() -> shopcloud::Result<()> {
//! let shop = ShopCloud::new("A2DE537C", "sk_61c394cf3346077b")?;
//! let token = shop.partner_token()?;
//! let payload: Payload = shop.read_token(&token)?;
//! assert!(payload.is_partner());
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod config;
pub mod crypto;
pub mod shop;
pub mod telemetry;
pub mod validator;

pub use codec::TokenCodec;
pub use config::ShopCloudConfig;
pub use shop::{ShopCloud, PARTNER_TOKEN_TTL_SECS, SHOP_SEPARATOR};
pub use shopcloud_common::{
    CampaignData, ErrorRecord, GroupData, OrganizationData, Payload, PersonData, Result, Section,
    ShopCloudError,
};
pub use validator::{validate, validate_value, Validation};

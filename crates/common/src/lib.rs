//! Payload records, validation error records, and errors shared across `shopcloud` crates.

pub mod error;
pub mod payload;

pub use error::{Result, ShopCloudError};
pub use payload::{
    CampaignData, ErrorRecord, GroupData, OrganizationData, Payload, PersonData, Section,
};

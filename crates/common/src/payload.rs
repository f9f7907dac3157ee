//! Records carried inside identified tokens.
//!
//! These types are serialised as JSON before encryption, so their field names
//! are the wire names partners send (`user_data`, `admin_data`, ...). Every
//! field is optional at the type level: a partially filled record must still
//! deserialise so that validation can report exactly what is missing. Keys a
//! record does not declare land in its `extra` map and are serialised back
//! out, so a token decrypts to exactly the JSON that was issued.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::ShopCloudError;

// ---------------------------------------------------------------------------
// Entity records
// ---------------------------------------------------------------------------

/// A user, or the admin contact of a campaign or organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Three-letter country code, e.g. `"CAN"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Keys this record does not declare, carried through encryption unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A fundraising campaign and its admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Validated even when absent: a missing admin is checked as an empty record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_data: Option<PersonData>,
    /// Keys this record does not declare, carried through encryption unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A group (team, roster entry) within a campaign.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_number: Option<String>,
    /// Keys this record does not declare, carried through encryption unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An organization and its admin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Validated even when absent: a missing admin is checked as an empty record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_data: Option<PersonData>,
    /// Keys this record does not declare, carried through encryption unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The envelope encrypted into a token.
///
/// An identified payload carries `user_data` and/or `campaign_data`; a partner
/// payload carries only `type` and `expires`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Payload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<PersonData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_data: Option<CampaignData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_data: Option<GroupData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_data: Option<OrganizationData>,
    /// Free-form tag, e.g. `"partner"`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Unix timestamp (seconds) after which the token should be considered stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
    /// Keys this record does not declare, carried through encryption unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Tag written into the `type` field of partner payloads.
pub const PARTNER_TYPE: &str = "partner";

impl Payload {
    /// Convert an untyped JSON value into a [`Payload`].
    ///
    /// # Errors
    ///
    /// Returns [`ShopCloudError::Structural`] if `value` is not a JSON object or
    /// one of its sections does not have the expected record shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ShopCloudError> {
        if !value.is_object() {
            return Err(ShopCloudError::Structural("payload must be an object".into()));
        }
        serde_json::from_value(value).map_err(|e| ShopCloudError::Structural(e.to_string()))
    }

    /// Build the system payload used for partner tokens.
    pub fn partner(expires: DateTime<Utc>) -> Self {
        Self {
            kind: Some(PARTNER_TYPE.into()),
            expires: Some(expires.timestamp()),
            ..Self::default()
        }
    }

    /// Returns `true` if this payload carries the partner tag.
    pub fn is_partner(&self) -> bool {
        self.kind.as_deref() == Some(PARTNER_TYPE)
    }

    /// Returns `true` if `expires` is set and not after `now`.
    ///
    /// Token reading never consults this; enforcing expiry is up to the caller.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|expires| expires <= now.timestamp())
    }
}

// ---------------------------------------------------------------------------
// Validation error records
// ---------------------------------------------------------------------------

/// The payload section a validation error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Payload,
    UserData,
    CampaignData,
    CampaignAdminData,
    GroupData,
    OrganizationData,
    OrganizationAdminData,
}

impl Section {
    /// The key under which this section's errors are reported.
    pub fn as_str(self) -> &'static str {
        match self {
            Section::Payload => "payload",
            Section::UserData => "user_data",
            Section::CampaignData => "campaign_data",
            Section::CampaignAdminData => "campaign_admin_data",
            Section::GroupData => "group_data",
            Section::OrganizationData => "organization_data",
            Section::OrganizationAdminData => "organization_admin_data",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-level validation failure.
///
/// Serialises as a single-key object: `{"user_data": "id missing."}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    pub section: Section,
    pub message: String,
}

impl ErrorRecord {
    /// Construct an [`ErrorRecord`] from a section and message.
    pub fn new(section: Section, message: impl Into<String>) -> Self {
        Self {
            section,
            message: message.into(),
        }
    }
}

impl Serialize for ErrorRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.section.as_str(), &self.message)?;
        map.end()
    }
}

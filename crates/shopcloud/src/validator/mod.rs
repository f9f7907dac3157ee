//! Payload validation.
//!
//! [`validate`] is a pure function: every call builds its own error list and
//! returns it inside a [`Validation`], so concurrent callers never share
//! state. Check order is fixed and observable:
//!
//! 1. structure (only for untyped input, see [`validate_value`])
//! 2. minimum content: `user_data` or `campaign_data`
//! 3. `user_data`
//! 4. `campaign_data`, then its admin
//! 5. `group_data`
//! 6. `organization_data`, then its admin

pub mod rules;

pub use rules::COUNTRIES;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use shopcloud_common::{
    CampaignData, ErrorRecord, GroupData, OrganizationData, Payload, PersonData, Section,
};

const NOT_AN_OBJECT: &str = "Payload must be an object";
const MINIMUM_CONTENT: &str = "At least must contain user_data or campaign_data.";

/// Outcome of validating one payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    errors: Vec<ErrorRecord>,
}

impl Validation {
    /// Returns `true` if no rule failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The failures in the order the rules ran.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// Consume the outcome, keeping only the failures.
    pub fn into_errors(self) -> Vec<ErrorRecord> {
        self.errors
    }
}

/// Validate a typed payload.
pub fn validate(payload: &Payload) -> Validation {
    let mut errors = Vec::new();

    if payload.user_data.is_none() && payload.campaign_data.is_none() {
        errors.push(ErrorRecord::new(Section::Payload, MINIMUM_CONTENT));
    }
    if let Some(user) = &payload.user_data {
        rules::person(Section::UserData, user, &mut errors);
    }
    if let Some(campaign) = &payload.campaign_data {
        rules::campaign(campaign, &mut errors);
    }
    if let Some(group) = &payload.group_data {
        rules::group(group, &mut errors);
    }
    if let Some(organization) = &payload.organization_data {
        rules::organization(organization, &mut errors);
    }

    Validation { errors }
}

/// Validate untyped JSON, starting with the structural check.
///
/// A value that is not an object records [`NOT_AN_OBJECT`]. An object whose
/// sections do not have record shape records one error per misshapen section,
/// carrying the parse error. Either way the minimum-content check then runs
/// against whatever keys are present. Section rules only run once the value
/// parses as a [`Payload`].
pub fn validate_value(value: &Value) -> Validation {
    let err = match Payload::from_value(value.clone()) {
        Ok(payload) => return validate(&payload),
        Err(err) => err,
    };
    let mut errors = match value.as_object() {
        None => vec![ErrorRecord::new(Section::Payload, NOT_AN_OBJECT)],
        Some(object) => malformed_sections(object),
    };
    if errors.is_empty() {
        errors.push(ErrorRecord::new(Section::Payload, err.to_string()));
    }
    if !has_section(value, "user_data") && !has_section(value, "campaign_data") {
        errors.push(ErrorRecord::new(Section::Payload, MINIMUM_CONTENT));
    }
    Validation { errors }
}

fn malformed_sections(object: &Map<String, Value>) -> Vec<ErrorRecord> {
    let mut errors = Vec::new();
    shape::<Option<PersonData>>(object, "user_data", Section::UserData, &mut errors);
    shape::<Option<CampaignData>>(object, "campaign_data", Section::CampaignData, &mut errors);
    shape::<Option<GroupData>>(object, "group_data", Section::GroupData, &mut errors);
    shape::<Option<OrganizationData>>(
        object,
        "organization_data",
        Section::OrganizationData,
        &mut errors,
    );
    shape::<Option<String>>(object, "type", Section::Payload, &mut errors);
    shape::<Option<i64>>(object, "expires", Section::Payload, &mut errors);
    errors
}

fn shape<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    section: Section,
    errors: &mut Vec<ErrorRecord>,
) {
    let Some(value) = object.get(key) else {
        return;
    };
    if let Err(e) = serde_json::from_value::<T>(value.clone()) {
        errors.push(ErrorRecord::new(section, format!("{key} is malformed: {e}")));
    }
}

fn has_section(value: &Value, key: &str) -> bool {
    value.get(key).is_some_and(|v| !v.is_null())
}

//! Per-record validation rules.
//!
//! Each function appends to a caller-owned error list in a fixed field order.
//! There is no short-circuiting: every rule runs.

use shopcloud_common::{
    CampaignData, ErrorRecord, GroupData, OrganizationData, PersonData, Section,
};

/// Country codes accepted in `country` fields.
pub const COUNTRIES: &[&str] = &["CAN", "USA"];

/// Checks `id`, `name`, `email`, then `country`, reporting under `section`.
pub fn person(section: Section, data: &PersonData, errors: &mut Vec<ErrorRecord>) {
    presence(section, "id", data.id.as_deref(), errors);
    presence(section, "name", data.name.as_deref(), errors);
    presence(section, "email", data.email.as_deref(), errors);
    inclusion(section, "country", COUNTRIES, data.country.as_deref(), errors);
}

/// Validates the campaign and then its admin under
/// [`Section::CampaignAdminData`]. A missing admin is checked as an empty
/// record, so it always yields four admin errors.
pub fn campaign(data: &CampaignData, errors: &mut Vec<ErrorRecord>) {
    let section = Section::CampaignData;
    presence(section, "id", data.id.as_deref(), errors);
    presence(section, "name", data.name.as_deref(), errors);
    presence(section, "category", data.category.as_deref(), errors);
    inclusion(section, "country", COUNTRIES, data.country.as_deref(), errors);
    let empty = PersonData::default();
    person(
        Section::CampaignAdminData,
        data.admin_data.as_ref().unwrap_or(&empty),
        errors,
    );
}

/// Only `name` is required; `player_number` is optional.
pub fn group(data: &GroupData, errors: &mut Vec<ErrorRecord>) {
    presence(Section::GroupData, "name", data.name.as_deref(), errors);
}

/// Same empty-admin behaviour as [`campaign`], under
/// [`Section::OrganizationAdminData`].
pub fn organization(data: &OrganizationData, errors: &mut Vec<ErrorRecord>) {
    let section = Section::OrganizationData;
    presence(section, "id", data.id.as_deref(), errors);
    presence(section, "name", data.name.as_deref(), errors);
    let empty = PersonData::default();
    person(
        Section::OrganizationAdminData,
        data.admin_data.as_ref().unwrap_or(&empty),
        errors,
    );
}

fn presence(section: Section, field: &str, value: Option<&str>, errors: &mut Vec<ErrorRecord>) {
    if value.map_or(true, str::is_empty) {
        errors.push(ErrorRecord::new(section, format!("{field} missing.")));
    }
}

// A missing value reports the same "must be one of" message as a wrong one.
fn inclusion(
    section: Section,
    field: &str,
    allowed: &[&str],
    value: Option<&str>,
    errors: &mut Vec<ErrorRecord>,
) {
    if !value.is_some_and(|v| allowed.contains(&v)) {
        errors.push(ErrorRecord::new(
            section,
            format!("{field} must be one of '{}'.", allowed.join(", ")),
        ));
    }
}

//! Database row types.
//!
//! Rows mirror the SQLite columns. Converting a row into its `crm_core`
//! record is where loose column values become typed: unknown stage labels
//! fall back to the first stage and unparseable timestamps read as absent.

use chrono::{DateTime, NaiveDateTime, Utc};
use crm_core::models::{
    Account, AccountRef, AccountStage, BuildingType, Contact, ContactStage, Property, PropertyStage,
    RepAssignment, Representative, RoofType,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A contact joined with its account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ContactRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: String,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub stage: String,
    pub last_interaction: Option<String>,
    pub created_at: String,
}

impl ContactRow {
    pub fn into_contact(self) -> Contact {
        Contact {
            account: account_ref(self.account_id, self.account_name),
            stage: ContactStage::from_label_or_default(&self.stage),
            last_interaction: self.last_interaction.as_deref().and_then(parse_timestamp),
            created_at: parse_timestamp(&self.created_at).unwrap_or(DateTime::UNIX_EPOCH),
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone.filter(|p| !p.is_empty()),
            role: self.role,
        }
    }
}

/// A property joined with its account name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PropertyRow {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub account_id: Option<String>,
    pub account_name: Option<String>,
    pub building_type: String,
    pub roof_type: String,
    pub stage: String,
    pub last_assessment: Option<String>,
}

impl PropertyRow {
    pub fn into_property(self) -> Property {
        Property {
            account: account_ref(self.account_id, self.account_name),
            building_type: BuildingType::from_label_or_default(&self.building_type),
            roof_type: RoofType::from_label_or_default(&self.roof_type),
            stage: PropertyStage::from_label_or_default(&self.stage),
            last_assessment: self.last_assessment.as_deref().and_then(parse_timestamp),
            id: self.id,
            name: self.name,
            address: self.address.filter(|a| !a.is_empty()),
        }
    }
}

/// An account without its rep assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AccountRow {
    pub id: String,
    pub name: String,
    pub company_type: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub stage: String,
}

impl AccountRow {
    pub fn into_account(self, reps: Vec<RepAssignment>) -> Account {
        Account {
            stage: AccountStage::from_label_or_default(&self.stage),
            id: self.id,
            name: self.name,
            company_type: self.company_type,
            city: self.city,
            state: self.state,
            reps,
        }
    }
}

/// A rep assignment joined with the rep's name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AssignmentRow {
    pub account_id: String,
    pub rep_id: String,
    pub rep_name: String,
    pub is_primary: bool,
}

impl AssignmentRow {
    pub fn into_assignment(self) -> RepAssignment {
        RepAssignment {
            rep_id: self.rep_id,
            rep_name: self.rep_name,
            is_primary: self.is_primary,
        }
    }
}

/// A representative on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct RepresentativeRow {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<RepresentativeRow> for Representative {
    fn from(row: RepresentativeRow) -> Self {
        Representative {
            id: row.id,
            name: row.name,
            email: row.email,
        }
    }
}

fn account_ref(id: Option<String>, name: Option<String>) -> Option<AccountRef> {
    match (id, name) {
        (Some(id), Some(name)) => Some(AccountRef { id, name }),
        _ => None,
    }
}

/// Parse an RFC 3339 timestamp or SQLite's `YYYY-MM-DD HH:MM:SS`.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|t| t.and_utc())
        })
}

/// Timestamp as stored in TEXT columns.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2024, 2, 3, 4, 5, 6).unwrap();
        assert_eq!(parse_timestamp("2024-02-03T04:05:06Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-02-03 04:05:06"), Some(expected));
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("last tuesday"), None);
        assert_eq!(format_timestamp(expected), "2024-02-03T04:05:06Z");
    }

    #[test]
    fn test_contact_row_falls_back_on_unknown_stage() {
        let row = ContactRow {
            id: "c1".to_string(),
            name: "Alice".to_string(),
            email: "alice@acme.com".to_string(),
            phone: Some(String::new()),
            role: "Owner".to_string(),
            account_id: Some("a1".to_string()),
            account_name: None,
            stage: "Warm Lead".to_string(),
            last_interaction: Some("garbage".to_string()),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        };
        let contact = row.into_contact();
        assert_eq!(contact.stage, ContactStage::Identified);
        assert_eq!(contact.phone, None);
        assert_eq!(contact.account, None);
        assert_eq!(contact.last_interaction, None);
    }
}

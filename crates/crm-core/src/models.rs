//! CRM domain records.
//!
//! Entities are plain data. Filtering, sorting and the rest of the list-view
//! behaviour live in their own modules and reach these records through the
//! [`Filterable`](crate::filter::Filterable) and
//! [`Sortable`](crate::sort::Sortable) traits.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{self, ValidationError};

/// Declares a closed set of display labels.
///
/// Each enum serialises as its label, parses back strictly through `parse`,
/// and leniently through `from_label_or_default`, which maps anything
/// unrecognised onto the declared fallback variant.
macro_rules! labeled_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident (fallback = $fallback:ident) {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $label)] $variant),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Display label, as stored by the backend.
            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            /// Parse an exact label.
            pub fn parse(label: &str) -> Option<Self> {
                match label {
                    $($label => Some($name::$variant),)+
                    _ => None,
                }
            }

            /// Parse a label, falling back for anything unknown.
            pub fn from_label_or_default(label: &str) -> Self {
                Self::parse(label).unwrap_or($name::$fallback)
            }

            /// Position in declaration order.
            pub fn ordinal(&self) -> usize {
                *self as usize
            }

            /// All labels, in declaration order.
            pub fn labels() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.label()).collect()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

labeled_enum! {
    /// Pipeline stage of a contact.
    pub enum ContactStage (fallback = Identified) {
        Identified => "Identified",
        Reached => "Reached",
        DmConfirmed => "DM Confirmed",
        Engaged => "Engaged",
        Dormant => "Dormant",
    }
}

labeled_enum! {
    /// Pipeline stage of a property.
    pub enum PropertyStage (fallback = Unassessed) {
        Unassessed => "Unassessed",
        Assessed => "Assessed",
        ProposalSent => "Proposal Sent",
        InNegotiation => "In Negotiation",
        Won => "Won",
        Lost => "Lost",
    }
}

labeled_enum! {
    /// Relationship stage of an account.
    pub enum AccountStage (fallback = Prospect) {
        Prospect => "Prospect",
        Active => "Active",
        Customer => "Customer",
        Churned => "Churned",
    }
}

labeled_enum! {
    /// Building use classification.
    pub enum BuildingType (fallback = Office) {
        Office => "Office",
        Retail => "Retail",
        Industrial => "Industrial",
        Warehouse => "Warehouse",
        Multifamily => "Multifamily",
        Healthcare => "Healthcare",
        Education => "Education",
        Hospitality => "Hospitality",
        Government => "Government",
        Religious => "Religious",
        MixedUse => "Mixed Use",
    }
}

labeled_enum! {
    /// Roof system classification.
    pub enum RoofType (fallback = Tpo) {
        Tpo => "TPO",
        Epdm => "EPDM",
        Pvc => "PVC",
        ModifiedBitumen => "Modified Bitumen",
        BuiltUp => "Built-Up",
        Metal => "Metal",
        Shingle => "Shingle",
        Tile => "Tile",
        Slate => "Slate",
        SprayFoam => "Spray Foam",
    }
}

/// Records that carry a pipeline stage, for summary counts.
pub trait Staged {
    /// Label of the record's current stage.
    fn stage_label(&self) -> &'static str;
}

/// Denormalised reference to the account a record belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRef {
    pub id: String,
    pub name: String,
}

/// A person at an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    /// Job title or role at the account.
    pub role: String,
    pub account: Option<AccountRef>,
    pub stage: ContactStage,
    pub last_interaction: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A building owned or managed by an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub name: String,
    pub address: Option<String>,
    pub account: Option<AccountRef>,
    pub building_type: BuildingType,
    pub roof_type: RoofType,
    pub stage: PropertyStage,
    pub last_assessment: Option<DateTime<Utc>>,
}

/// A customer organisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub company_type: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub stage: AccountStage,
    pub reps: Vec<RepAssignment>,
}

impl Account {
    /// The rep treated as primary.
    ///
    /// The flagged rep wins; otherwise the first assigned rep stands in.
    pub fn primary_rep(&self) -> Option<&RepAssignment> {
        self.reps
            .iter()
            .find(|r| r.is_primary)
            .or_else(|| self.reps.first())
    }

    /// "City, ST" style location, if any part is known.
    pub fn location(&self) -> Option<String> {
        match (&self.city, &self.state) {
            (Some(city), Some(state)) => Some(format!("{}, {}", city, state)),
            (Some(city), None) => Some(city.clone()),
            (None, Some(state)) => Some(state.clone()),
            (None, None) => None,
        }
    }
}

/// A sales representative association on an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepAssignment {
    pub rep_id: String,
    pub rep_name: String,
    pub is_primary: bool,
}

/// A sales representative on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representative {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Staged for Contact {
    fn stage_label(&self) -> &'static str {
        self.stage.label()
    }
}

impl Staged for Property {
    fn stage_label(&self) -> &'static str {
        self.stage.label()
    }
}

impl Staged for Account {
    fn stage_label(&self) -> &'static str {
        self.stage.label()
    }
}

/// Fields accepted when creating a contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub stage: ContactStage,
}

impl NewContact {
    /// Check required fields before anything is sent to the backend.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_required("name", &self.name)?;
        validation::validate_email(&self.email)?;
        Ok(())
    }
}

/// Fields accepted when creating a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProperty {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
    pub building_type: BuildingType,
    pub roof_type: RoofType,
    #[serde(default)]
    pub stage: PropertyStage,
}

impl NewProperty {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_required("name", &self.name)?;
        if let Some(address) = &self.address {
            validation::validate_required("address", address)?;
        }
        Ok(())
    }
}

/// Fields accepted when creating an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAccount {
    pub name: String,
    #[serde(default)]
    pub company_type: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub stage: AccountStage,
}

impl NewAccount {
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_required("name", &self.name)
    }
}

/// Partial update applied to each contact in a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPatch {
    #[serde(default)]
    pub stage: Option<ContactStage>,
    #[serde(default)]
    pub role: Option<String>,
}

/// Partial update applied to each property in a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyPatch {
    #[serde(default)]
    pub stage: Option<PropertyStage>,
    #[serde(default)]
    pub building_type: Option<BuildingType>,
    #[serde(default)]
    pub roof_type: Option<RoofType>,
}

/// Partial update applied to each account in a bulk action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountPatch {
    #[serde(default)]
    pub stage: Option<AccountStage>,
    #[serde(default)]
    pub company_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enum_cardinalities() {
        assert_eq!(ContactStage::ALL.len(), 5);
        assert_eq!(PropertyStage::ALL.len(), 6);
        assert_eq!(BuildingType::ALL.len(), 11);
        assert_eq!(RoofType::ALL.len(), 10);
    }

    #[test]
    fn test_stage_labels_round_trip() {
        for stage in ContactStage::ALL {
            assert_eq!(ContactStage::parse(stage.label()), Some(*stage));
        }
        assert_eq!(ContactStage::DmConfirmed.label(), "DM Confirmed");
        assert_eq!(PropertyStage::InNegotiation.to_string(), "In Negotiation");
    }

    #[test]
    fn test_unknown_stage_falls_back() {
        assert_eq!(ContactStage::from_label_or_default("Qualified"), ContactStage::Identified);
        assert_eq!(ContactStage::from_label_or_default(""), ContactStage::Identified);
        assert_eq!(PropertyStage::from_label_or_default("??"), PropertyStage::Unassessed);
        assert_eq!(ContactStage::parse("engaged"), None);
    }

    #[test]
    fn test_stage_serializes_as_label() {
        let json = serde_json::to_string(&ContactStage::DmConfirmed).unwrap();
        assert_eq!(json, "\"DM Confirmed\"");
        let back: RoofType = serde_json::from_str("\"Modified Bitumen\"").unwrap();
        assert_eq!(back, RoofType::ModifiedBitumen);
    }

    #[test]
    fn test_primary_rep_defaults_to_first() {
        let mut account = Account {
            id: "a1".to_string(),
            name: "Acme".to_string(),
            company_type: "REIT".to_string(),
            city: Some("Austin".to_string()),
            state: Some("TX".to_string()),
            stage: AccountStage::Active,
            reps: vec![
                RepAssignment {
                    rep_id: "r1".to_string(),
                    rep_name: "Dana".to_string(),
                    is_primary: false,
                },
                RepAssignment {
                    rep_id: "r2".to_string(),
                    rep_name: "Eli".to_string(),
                    is_primary: false,
                },
            ],
        };
        assert_eq!(account.primary_rep().unwrap().rep_id, "r1");

        account.reps[1].is_primary = true;
        assert_eq!(account.primary_rep().unwrap().rep_id, "r2");
        assert_eq!(account.location().as_deref(), Some("Austin, TX"));
    }

    #[test]
    fn test_new_contact_validation() {
        let contact = NewContact {
            name: "Alice".to_string(),
            email: "alice@acme.com".to_string(),
            phone: None,
            role: String::new(),
            account_id: None,
            stage: ContactStage::default(),
        };
        assert!(contact.validate().is_ok());

        let bad = NewContact {
            email: "not-an-email".to_string(),
            ..contact
        };
        assert!(matches!(bad.validate(), Err(ValidationError::InvalidEmail(_))));
    }
}

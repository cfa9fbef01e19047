//! Sort configuration and the type-aware comparator.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::models::{Account, Contact, Property};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(CoreError::UnknownSortDirection(s.to_string())),
        }
    }
}

/// Which field a list is ordered by, and which way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortConfig<F> {
    pub field: F,
    pub direction: SortDirection,
}

impl<F: Copy + PartialEq> SortConfig<F> {
    pub fn new(field: F, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: F) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: F) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Column-header click: the same field flips direction, a new field
    /// starts ascending.
    pub fn toggle(&mut self, field: F) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Ascending;
        }
    }
}

/// A field value coerced for comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortValue<'a> {
    /// Compared case-folded; missing sorts as the empty string.
    Text(Option<&'a str>),
    /// Compared as instants; missing sorts as the Unix epoch.
    Timestamp(Option<DateTime<Utc>>),
    /// Compared numerically; missing sorts as zero.
    Number(Option<f64>),
}

/// Records that can be ordered by a field.
pub trait Sortable {
    type Field: Copy + PartialEq + fmt::Debug;

    fn sort_value(&self, field: Self::Field) -> SortValue<'_>;
}

/// Three-way comparison of two records under `config`.
///
/// Descending negates the ascending result, so the epoch fallback for
/// missing timestamps flips along with everything else.
pub fn compare<T: Sortable>(a: &T, b: &T, config: &SortConfig<T::Field>) -> Ordering {
    let ordering = compare_values(a.sort_value(config.field), b.sort_value(config.field));
    match config.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

/// Stable in-place sort; ties keep their relative order.
pub fn sort_entities<T: Sortable>(records: &mut [T], config: &SortConfig<T::Field>) {
    records.sort_by(|a, b| compare(a, b, config));
}

fn compare_values(a: SortValue<'_>, b: SortValue<'_>) -> Ordering {
    match (a, b) {
        (SortValue::Text(x), SortValue::Text(y)) => fold(x).cmp(&fold(y)),
        (SortValue::Timestamp(x), SortValue::Timestamp(y)) => instant(x).cmp(&instant(y)),
        (SortValue::Number(x), SortValue::Number(y)) => {
            x.unwrap_or(0.0).total_cmp(&y.unwrap_or(0.0))
        }
        // One field always yields one kind.
        _ => Ordering::Equal,
    }
}

fn fold(value: Option<&str>) -> String {
    value.unwrap_or("").to_lowercase()
}

fn instant(value: Option<DateTime<Utc>>) -> DateTime<Utc> {
    value.unwrap_or(DateTime::UNIX_EPOCH)
}

macro_rules! sort_fields {
    ($(#[$meta:meta])* pub enum $name:ident { $($variant:ident => $key:literal $(| $alias:literal)*),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $key),+
                }
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key $(| $alias)* => Ok($name::$variant),)+
                    other => Err(CoreError::UnknownSortField(other.to_string())),
                }
            }
        }
    };
}

sort_fields! {
    /// Sortable columns of the contacts list.
    pub enum ContactSortField {
        Name => "name",
        Email => "email",
        Role => "role",
        Account => "account",
        Stage => "stage",
        LastInteraction => "last_interaction" | "lastInteraction",
        CreatedAt => "created_at" | "createdAt",
    }
}

sort_fields! {
    /// Sortable columns of the properties list.
    pub enum PropertySortField {
        Name => "name",
        Address => "address",
        Account => "account",
        BuildingType => "building_type" | "buildingType",
        RoofType => "roof_type" | "roofType",
        Stage => "stage",
        LastAssessment => "last_assessment" | "lastAssessment",
    }
}

sort_fields! {
    /// Sortable columns of the accounts list.
    pub enum AccountSortField {
        Name => "name",
        CompanyType => "company_type" | "companyType",
        City => "city",
        Stage => "stage",
        RepCount => "rep_count" | "repCount",
    }
}

impl Sortable for Contact {
    type Field = ContactSortField;

    fn sort_value(&self, field: ContactSortField) -> SortValue<'_> {
        match field {
            ContactSortField::Name => SortValue::Text(Some(&self.name)),
            ContactSortField::Email => SortValue::Text(Some(&self.email)),
            ContactSortField::Role => SortValue::Text(Some(&self.role)),
            ContactSortField::Account => {
                SortValue::Text(self.account.as_ref().map(|a| a.name.as_str()))
            }
            ContactSortField::Stage => SortValue::Number(Some(self.stage.ordinal() as f64)),
            ContactSortField::LastInteraction => SortValue::Timestamp(self.last_interaction),
            ContactSortField::CreatedAt => SortValue::Timestamp(Some(self.created_at)),
        }
    }
}

impl Sortable for Property {
    type Field = PropertySortField;

    fn sort_value(&self, field: PropertySortField) -> SortValue<'_> {
        match field {
            PropertySortField::Name => SortValue::Text(Some(&self.name)),
            PropertySortField::Address => SortValue::Text(self.address.as_deref()),
            PropertySortField::Account => {
                SortValue::Text(self.account.as_ref().map(|a| a.name.as_str()))
            }
            PropertySortField::BuildingType => SortValue::Text(Some(self.building_type.label())),
            PropertySortField::RoofType => SortValue::Text(Some(self.roof_type.label())),
            PropertySortField::Stage => SortValue::Number(Some(self.stage.ordinal() as f64)),
            PropertySortField::LastAssessment => SortValue::Timestamp(self.last_assessment),
        }
    }
}

impl Sortable for Account {
    type Field = AccountSortField;

    fn sort_value(&self, field: AccountSortField) -> SortValue<'_> {
        match field {
            AccountSortField::Name => SortValue::Text(Some(&self.name)),
            AccountSortField::CompanyType => SortValue::Text(Some(&self.company_type)),
            AccountSortField::City => SortValue::Text(self.city.as_deref()),
            AccountSortField::Stage => SortValue::Number(Some(self.stage.ordinal() as f64)),
            AccountSortField::RepCount => SortValue::Number(Some(self.reps.len() as f64)),
        }
    }
}

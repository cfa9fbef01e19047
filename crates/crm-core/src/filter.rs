//! Filter criteria and the per-record predicate.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::CoreError;
use crate::models::{Account, Contact, Property};

/// A field a list view can be filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKey {
    /// Generic search box (name, email, phone, ...).
    Search,
    Account,
    Property,
    Address,
    Role,
    Stage,
    BuildingType,
    RoofType,
}

/// How a criterion is compared against a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Substring of any search haystack.
    Search,
    /// Case-insensitive substring.
    FreeText,
    /// Case-sensitive equality.
    Exact,
}

impl FilterKey {
    pub const ALL: &'static [FilterKey] = &[
        FilterKey::Search,
        FilterKey::Account,
        FilterKey::Property,
        FilterKey::Address,
        FilterKey::Role,
        FilterKey::Stage,
        FilterKey::BuildingType,
        FilterKey::RoofType,
    ];

    /// Query-string name of the key.
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKey::Search => "search",
            FilterKey::Account => "account",
            FilterKey::Property => "property",
            FilterKey::Address => "address",
            FilterKey::Role => "role",
            FilterKey::Stage => "stage",
            FilterKey::BuildingType => "building_type",
            FilterKey::RoofType => "roof_type",
        }
    }

    pub fn kind(&self) -> FilterKind {
        match self {
            FilterKey::Search => FilterKind::Search,
            FilterKey::Account | FilterKey::Property | FilterKey::Address => FilterKind::FreeText,
            FilterKey::Role | FilterKey::Stage | FilterKey::BuildingType | FilterKey::RoofType => {
                FilterKind::Exact
            }
        }
    }
}

impl FromStr for FilterKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" | "q" => Ok(FilterKey::Search),
            "account" => Ok(FilterKey::Account),
            "property" => Ok(FilterKey::Property),
            "address" => Ok(FilterKey::Address),
            "role" => Ok(FilterKey::Role),
            "stage" => Ok(FilterKey::Stage),
            "building_type" | "buildingType" => Ok(FilterKey::BuildingType),
            "roof_type" | "roofType" => Ok(FilterKey::RoofType),
            other => Err(CoreError::UnknownFilterKey(other.to_string())),
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for FilterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Current filter values of one list view.
///
/// An empty string places no constraint on its field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCriteria {
    values: BTreeMap<FilterKey, String>,
}

impl FilterCriteria {
    /// Criteria with every field empty.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build criteria from query-string pairs.
    pub fn from_pairs<K, V, I>(pairs: I) -> Result<Self, CoreError>
    where
        K: AsRef<str>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut criteria = Self::new();
        for (key, value) in pairs {
            let key: FilterKey = key.as_ref().parse()?;
            criteria.set(key, value);
        }
        Ok(criteria)
    }

    /// Builder-style `set`.
    pub fn with(mut self, key: FilterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: FilterKey, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
    }

    /// Current value of a field; empty when unconstrained.
    pub fn get(&self, key: FilterKey) -> &str {
        self.values.get(&key).map(String::as_str).unwrap_or("")
    }

    pub fn clear_field(&mut self, key: FilterKey) {
        self.values.remove(&key);
    }

    /// "Clear filters": every field back to empty.
    pub fn reset(&mut self) {
        self.values.clear();
    }

    pub fn is_unconstrained(&self) -> bool {
        self.values.is_empty()
    }

    /// Non-empty criteria in key order.
    pub fn active(&self) -> impl Iterator<Item = (FilterKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

/// A haystack for the generic search criterion.
#[derive(Debug, Clone, Copy)]
pub enum SearchField<'a> {
    /// Compared case-insensitively.
    Folded(Option<&'a str>),
    /// Compared as-is (phone numbers).
    Raw(Option<&'a str>),
}

/// Records that can be matched against [`FilterCriteria`].
pub trait Filterable {
    /// Haystacks searched by [`FilterKey::Search`].
    fn search_fields(&self) -> Vec<SearchField<'_>>;

    /// Value compared for a non-search key.
    ///
    /// `None` covers both an absent value and a key the record type does
    /// not have; either way a constrained field rejects the record.
    fn field_value(&self, key: FilterKey) -> Option<&str>;
}

/// True iff `record` satisfies every non-empty criterion.
pub fn matches<T: Filterable + ?Sized>(record: &T, criteria: &FilterCriteria) -> bool {
    criteria.active().all(|(key, needle)| match key.kind() {
        FilterKind::Search => matches_search(record, needle),
        FilterKind::FreeText => record
            .field_value(key)
            .is_some_and(|value| contains_folded(value, needle)),
        FilterKind::Exact => record.field_value(key) == Some(needle),
    })
}

/// Records satisfying `criteria`, in their original order.
pub fn apply<'a, T: Filterable>(records: &'a [T], criteria: &FilterCriteria) -> Vec<&'a T> {
    records.iter().filter(|r| matches(*r, criteria)).collect()
}

fn matches_search<T: Filterable + ?Sized>(record: &T, needle: &str) -> bool {
    let folded_needle = needle.to_lowercase();
    record.search_fields().into_iter().any(|field| match field {
        SearchField::Folded(Some(value)) => value.to_lowercase().contains(&folded_needle),
        SearchField::Raw(Some(value)) => value.contains(needle),
        SearchField::Folded(None) | SearchField::Raw(None) => false,
    })
}

fn contains_folded(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl Filterable for Contact {
    fn search_fields(&self) -> Vec<SearchField<'_>> {
        vec![
            SearchField::Folded(Some(&self.name)),
            SearchField::Folded(Some(&self.email)),
            SearchField::Raw(self.phone.as_deref()),
        ]
    }

    fn field_value(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Account => self.account.as_ref().map(|a| a.name.as_str()),
            FilterKey::Role => Some(&self.role),
            FilterKey::Stage => Some(self.stage.label()),
            _ => None,
        }
    }
}

impl Filterable for Property {
    fn search_fields(&self) -> Vec<SearchField<'_>> {
        vec![
            SearchField::Folded(Some(&self.name)),
            SearchField::Folded(self.address.as_deref()),
        ]
    }

    fn field_value(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Property => Some(&self.name),
            FilterKey::Address => self.address.as_deref(),
            FilterKey::Account => self.account.as_ref().map(|a| a.name.as_str()),
            FilterKey::Stage => Some(self.stage.label()),
            FilterKey::BuildingType => Some(self.building_type.label()),
            FilterKey::RoofType => Some(self.roof_type.label()),
            _ => None,
        }
    }
}

impl Filterable for Account {
    fn search_fields(&self) -> Vec<SearchField<'_>> {
        vec![
            SearchField::Folded(Some(&self.name)),
            SearchField::Folded(self.city.as_deref()),
            SearchField::Folded(Some(&self.company_type)),
        ]
    }

    fn field_value(&self, key: FilterKey) -> Option<&str> {
        match key {
            FilterKey::Account => Some(&self.name),
            FilterKey::Address => self.city.as_deref(),
            FilterKey::Stage => Some(self.stage.label()),
            _ => None,
        }
    }
}

//! Domain model and list-view logic for the field CRM.
//!
//! Contacts, properties and accounts are shown in list pages that all follow
//! the same shape:
//!
//! - a [`RepositoryAdapter`] loads records from the backend and reports every
//!   outcome as an [`Envelope`],
//! - [`filter::matches`] and [`sort::compare`] narrow and order the records,
//! - a [`ListView`] memoises the filtered, sorted rows and their [`Summary`],
//! - a [`SelectionTracker`] holds the ids a bulk action applies to.
//!
//! # Example
//!
//! ```rust
//! use crm_core::{FilterKey, ListView, SortConfig};
//! use crm_core::models::{Contact, ContactStage};
//! use crm_core::sort::ContactSortField;
//!
//! let contacts: Vec<Contact> = Vec::new();
//! let mut view = ListView::with_records(contacts, SortConfig::ascending(ContactSortField::Name));
//! view.criteria_mut().set(FilterKey::Stage, ContactStage::Engaged.label());
//!
//! let snapshot = view.snapshot();
//! println!("{}", snapshot.summary.showing("contacts"));
//! ```

pub mod assignment;
pub mod auth;
pub mod envelope;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod outcome;
pub mod repository;
pub mod selection;
pub mod session;
pub mod sort;
pub mod validation;
pub mod view;

pub use async_trait::async_trait;
pub use envelope::Envelope;
pub use error::{CoreError, Result, StoreError};
pub use filter::{FilterCriteria, FilterKey, Filterable};
pub use outcome::{BulkAction, BulkOutcome, BulkStatus, Noun};
pub use repository::{BulkCount, BulkFailure, EntityStore, RepositoryAdapter};
pub use selection::SelectionTracker;
pub use session::{Role, Session};
pub use sort::{SortConfig, SortDirection, Sortable};
pub use validation::ValidationError;
pub use view::{ListView, LoadTicket, Summary, ViewSnapshot};

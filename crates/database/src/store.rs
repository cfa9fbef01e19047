//! [`EntityStore`] implementations backed by SQLite.
//!
//! These are what the web layer wraps in a `RepositoryAdapter`. They always
//! return the whole table; criteria are applied by the list view so summary
//! counts cover every record.

use async_trait::async_trait;
use crm_core::models::{
    Account, AccountPatch, Contact, ContactPatch, NewAccount, NewContact, NewProperty, Property,
    PropertyPatch,
};
use crm_core::{EntityStore, FilterCriteria, StoreError};
use sqlx::SqlitePool;

macro_rules! sqlite_store {
    (
        $(#[$meta:meta])*
        $store:ident, $name:literal, $entity:ty, $patch:ty, $new:ty,
        list = $list:path,
        update = $update:path,
        delete = $delete:path,
        create = $create:path $(,)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $store {
            pool: SqlitePool,
        }

        impl $store {
            pub fn new(pool: SqlitePool) -> Self {
                Self { pool }
            }
        }

        #[async_trait]
        impl EntityStore for $store {
            type Entity = $entity;
            type Patch = $patch;
            type NewFields = $new;

            fn entity_name(&self) -> &'static str {
                $name
            }

            async fn list(&self, _criteria: &FilterCriteria) -> Result<Vec<$entity>, StoreError> {
                Ok($list(&self.pool).await?)
            }

            async fn update(&self, id: &str, patch: &$patch) -> Result<(), StoreError> {
                Ok($update(&self.pool, id, patch).await?)
            }

            async fn delete(&self, id: &str) -> Result<(), StoreError> {
                Ok($delete(&self.pool, id).await?)
            }

            async fn create(&self, fields: &$new) -> Result<$entity, StoreError> {
                Ok($create(&self.pool, fields).await?)
            }
        }
    };
}

sqlite_store! {
    /// Contacts table.
    ContactStore, "contact", Contact, ContactPatch, NewContact,
    list = crate::contact::list_contacts,
    update = crate::contact::update_contact,
    delete = crate::contact::delete_contact,
    create = crate::contact::create_contact,
}

sqlite_store! {
    /// Properties table.
    PropertyStore, "property", Property, PropertyPatch, NewProperty,
    list = crate::property::list_properties,
    update = crate::property::update_property,
    delete = crate::property::delete_property,
    create = crate::property::create_property,
}

sqlite_store! {
    /// Accounts table, with rep assignments attached on read.
    AccountStore, "account", Account, AccountPatch, NewAccount,
    list = crate::account::list_accounts,
    update = crate::account::update_account,
    delete = crate::account::delete_account,
    create = crate::account::create_account,
}

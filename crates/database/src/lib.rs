//! SQLite backend for the field CRM.
//!
//! This crate stores contacts, properties, accounts and the representative
//! roster using SQLx with SQLite, and computes the manager dashboard
//! aggregates. The [`store`] module exposes each table as a
//! [`crm_core::EntityStore`] so list pages can drive it through a
//! [`crm_core::RepositoryAdapter`].
//!
//! # Example
//!
//! ```no_run
//! use crm_core::models::{ContactStage, NewContact};
//! use database::{contact, Database};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:crm.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Create a contact
//!     let fields = NewContact {
//!         name: "Alice Moreno".to_string(),
//!         email: "alice@gulfreit.com".to_string(),
//!         phone: None,
//!         role: "Facilities Director".to_string(),
//!         account_id: None,
//!         stage: ContactStage::Identified,
//!     };
//!     let contact = contact::create_contact(db.pool(), &fields).await?;
//!     println!("created {}", contact.id);
//!
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod contact;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod property;
pub mod rep;
pub mod store;

pub use dashboard::ManagerMetrics;
pub use error::{DatabaseError, Result};
pub use store::{AccountStore, ContactStore, PropertyStore};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 10;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/crm.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database; keep one.
        let pool_size = if url.contains(":memory:") { 1 } else { pool_size };

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// This should be called once after connecting to ensure the schema is up to date.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn contacts(&self) -> ContactStore {
        ContactStore::new(self.pool.clone())
    }

    pub fn properties(&self) -> PropertyStore {
        PropertyStore::new(self.pool.clone())
    }

    pub fn accounts(&self) -> AccountStore {
        AccountStore::new(self.pool.clone())
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

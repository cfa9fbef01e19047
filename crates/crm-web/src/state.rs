//! Application state shared across handlers.

use crm_core::{RepositoryAdapter, Session};
use database::{AccountStore, ContactStore, Database, PropertyStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    pub contacts: RepositoryAdapter<ContactStore>,
    pub properties: RepositoryAdapter<PropertyStore>,
    pub accounts: RepositoryAdapter<AccountStore>,
    /// Signed-in user, fixed at start-up.
    pub session: Session,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, session: Session) -> Self {
        Self {
            contacts: RepositoryAdapter::new(db.contacts()),
            properties: RepositoryAdapter::new(db.properties()),
            accounts: RepositoryAdapter::new(db.accounts()),
            db,
            session,
        }
    }
}

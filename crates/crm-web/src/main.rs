//! Web server for the field CRM.
//!
//! Serves the manager dashboard as server-rendered HTML and the list pages'
//! data (filtered, sorted and summarised) as JSON.

mod config;
mod error;
mod routes;
mod state;

use crm_core::Session;
use database::Database;
use tower_http::services::ServeDir;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting CRM web server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let session = Session::from_flags(&config.session_flags);
    info!(
        authenticated = session.authenticated,
        landing = session.landing_path(),
        "Session loaded"
    );

    // Build application state
    let state = AppState::new(db, session);

    // Build router
    let app = routes::router()
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .with_state(state);

    // Start server
    info!(addr = %config.addr, "CRM web server listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

//! Health check endpoint.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
}

/// Health check endpoint; also pings the database.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Health>) {
    match ping_database(&state).await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok".to_string(),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "degraded".to_string(),
                }),
            )
        }
    }
}

async fn ping_database(state: &AppState) -> database::Result<()> {
    database::contact::count_contacts(state.db.pool()).await.map(|_| ())
}

//! Manager dashboard routes.

use std::collections::BTreeMap;

use askama::Template;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use crm_core::Session;
use database::dashboard::{self, ManagerMetrics};
use serde::Serialize;

use crate::error::Result;
use crate::state::AppState;

/// Dashboard page template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub metrics: ManagerMetrics,
    pub user: String,
}

/// Render the dashboard page.
///
/// Signed-in users whose role has no dashboard go to their landing page.
pub async fn dashboard_page(State(state): State<AppState>) -> Result<Response> {
    let session = &state.session;
    if session.should_skip_login() && !session.role.is_some_and(|r| r.can_view_dashboard()) {
        return Ok(Redirect::to(session.landing_path()).into_response());
    }

    let metrics = dashboard::manager_metrics(state.db.pool()).await?;
    let user = session.email.clone().unwrap_or_else(|| "guest".to_string());
    Ok(DashboardTemplate { metrics, user }.into_response())
}

/// Get dashboard statistics as JSON.
pub async fn stats_api(State(state): State<AppState>) -> Result<Json<ManagerMetrics>> {
    let metrics = dashboard::manager_metrics(state.db.pool()).await?;
    Ok(Json(metrics))
}

/// Session as seen by the client.
#[derive(Serialize)]
pub struct SessionInfo {
    #[serde(flatten)]
    pub session: Session,
    pub landing: &'static str,
    pub skip_login: bool,
    pub flags: BTreeMap<String, String>,
}

/// `GET /api/session`
pub async fn session_api(State(state): State<AppState>) -> Json<SessionInfo> {
    let session = state.session.clone();
    Json(SessionInfo {
        landing: session.landing_path(),
        skip_login: session.should_skip_login(),
        flags: session.to_flags(),
        session,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::test_state;
    use axum::http::{header, StatusCode};
    use chrono::Utc;
    use crm_core::Role;

    #[tokio::test]
    async fn test_empty_dashboard_renders() {
        let state = test_state().await;
        let response = dashboard_page(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rep_is_redirected() {
        let mut state = test_state().await;
        state.session = Session::signed_in(Role::Rep, "eli@roofco.com", Utc::now());

        let response = dashboard_page(State(state)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/contacts");
    }

    #[tokio::test]
    async fn test_session_api() {
        let mut state = test_state().await;
        state.session = Session::signed_in(Role::Manager, "dana@roofco.com", Utc::now());

        let Json(info) = session_api(State(state)).await;
        assert_eq!(info.landing, "/dashboard");
        assert!(info.skip_login);
        assert_eq!(info.flags.get("userRole").unwrap(), "manager");
    }

    #[tokio::test]
    async fn test_stats_api_counts() {
        let state = test_state().await;
        let Json(metrics) = stats_api(State(state)).await.unwrap();
        assert_eq!(metrics.total_contacts, 0);
        assert!(metrics.rep_loads.is_empty());
    }
}

//! Auth-link redirect endpoints.
//!
//! Providers may put parameters in the URL fragment, which browsers never
//! send; the page script forwards them here as a query string.

use std::collections::HashMap;

use axum::extract::Query;
use axum::Json;
use crm_core::auth::{self, AuthFlow, AuthLinkType, CallbackParams};
use serde::Serialize;

/// Resolved link state and the page to go to next.
#[derive(Debug, Serialize)]
pub struct CallbackResponse {
    pub flow: AuthFlow,
    pub next: &'static str,
}

impl CallbackResponse {
    fn resolve(query: HashMap<String, String>, expected: &[AuthLinkType]) -> Self {
        let params = CallbackParams::from_pairs(query);
        let flow = auth::resolve(&params, expected);
        let next = next_path(&flow);
        match &flow {
            AuthFlow::Ready { kind, .. } => tracing::info!(kind = %kind, "Auth link accepted"),
            other => tracing::warn!(flow = ?other, "Auth link rejected"),
        }
        Self { flow, next }
    }
}

fn next_path(flow: &AuthFlow) -> &'static str {
    match flow {
        AuthFlow::Ready {
            kind: AuthLinkType::Recovery,
            ..
        } => "/reset-password",
        AuthFlow::Ready {
            kind: AuthLinkType::Magiclink,
            ..
        } => "/dashboard",
        AuthFlow::Ready { .. } => "/login",
        flow if flow.offers_resend() => "/forgot-password",
        _ => "/login",
    }
}

/// `GET /auth/callback`: any link kind.
pub async fn callback_api(Query(query): Query<HashMap<String, String>>) -> Json<CallbackResponse> {
    Json(CallbackResponse::resolve(query, &[]))
}

/// `GET /auth/recovery`: password reset links only.
pub async fn recovery_api(Query(query): Query<HashMap<String, String>>) -> Json<CallbackResponse> {
    Json(CallbackResponse::resolve(query, &[AuthLinkType::Recovery]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::query;

    #[tokio::test]
    async fn test_recovery_link_ready() {
        let Json(response) = recovery_api(Query(query(&[
            ("access_token", "at"),
            ("refresh_token", "rt"),
            ("type", "recovery"),
        ])))
        .await;
        assert!(matches!(
            response.flow,
            AuthFlow::Ready {
                kind: AuthLinkType::Recovery,
                ..
            }
        ));
        assert_eq!(response.next, "/reset-password");
    }

    #[tokio::test]
    async fn test_recovery_rejects_magic_link() {
        let Json(response) = recovery_api(Query(query(&[
            ("access_token", "at"),
            ("refresh_token", "rt"),
            ("type", "magiclink"),
        ])))
        .await;
        assert!(matches!(response.flow, AuthFlow::LinkInvalid { .. }));
        assert_eq!(response.next, "/forgot-password");
    }

    #[tokio::test]
    async fn test_expired_link() {
        let Json(response) = callback_api(Query(query(&[
            ("error", "access_denied"),
            ("error_code", "otp_expired"),
            ("error_description", "Email link is invalid or has expired"),
        ])))
        .await;
        assert!(matches!(response.flow, AuthFlow::LinkExpired { .. }));
        assert!(response.flow.offers_resend());
    }

    #[test]
    fn test_generic_failure_goes_to_login() {
        let flow = AuthFlow::Failed {
            message: "server_error".to_string(),
        };
        assert_eq!(next_path(&flow), "/login");
    }
}

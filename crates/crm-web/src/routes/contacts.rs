//! Contacts list endpoints.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use crm_core::export;
use crm_core::models::{Contact, ContactPatch, ContactStage, NewContact};
use crm_core::sort::ContactSortField;
use crm_core::{BulkAction, Envelope, Noun, SortConfig};
use database::contact;
use serde::Deserialize;

use super::{csv_response, list_page, selected_rows, BulkResponse, ListResponse, SelectionBody};
use crate::error::Result;
use crate::state::AppState;

/// Newest contacts first.
fn default_sort() -> SortConfig<ContactSortField> {
    SortConfig::descending(ContactSortField::CreatedAt)
}

fn contact_id(contact: &Contact) -> &str {
    &contact.id
}

/// Body of a bulk stage change.
#[derive(Debug, Deserialize)]
pub struct BulkStageBody {
    pub ids: Vec<String>,
    pub stage: ContactStage,
}

/// `GET /api/contacts?search=&account=&role=&stage=&sort=&dir=`
pub async fn list_api(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<ListResponse<Contact, ContactSortField>>>> {
    list_page(&state.contacts, query, default_sort(), Noun::CONTACT).await
}

/// `POST /api/contacts`
pub async fn create_api(
    State(state): State<AppState>,
    Json(fields): Json<NewContact>,
) -> Result<Json<Envelope<Contact>>> {
    fields.validate()?;
    Ok(Json(state.contacts.create(&fields).await))
}

/// `DELETE /api/contacts/:id`
pub async fn delete_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Envelope<()>> {
    Json(state.contacts.delete(&id).await)
}

/// `POST /api/contacts/bulk-stage`
pub async fn bulk_stage_api(
    State(state): State<AppState>,
    Json(body): Json<BulkStageBody>,
) -> Json<BulkResponse> {
    let patch = ContactPatch {
        stage: Some(body.stage),
        ..ContactPatch::default()
    };
    let envelope = state.contacts.bulk_update(&body.ids, &patch).await;
    Json(BulkResponse::new(BulkAction::Update, Noun::CONTACT, envelope))
}

/// `POST /api/contacts/bulk-delete`
pub async fn bulk_delete_api(
    State(state): State<AppState>,
    Json(body): Json<SelectionBody>,
) -> Json<BulkResponse> {
    let envelope = state.contacts.bulk_delete(&body.ids).await;
    Json(BulkResponse::new(BulkAction::Delete, Noun::CONTACT, envelope))
}

/// `POST /api/contacts/:id/interaction`: log a touchpoint now.
pub async fn record_interaction_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Contact>> {
    let pool = state.db.pool();
    contact::record_interaction(pool, &id, Utc::now()).await?;
    Ok(Json(contact::get_contact(pool, &id).await?))
}

/// `POST /api/contacts/export?sort=&dir=`
pub async fn export_api(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<SelectionBody>,
) -> Result<Response> {
    let rows = selected_rows(&state.contacts, query, default_sort(), body.ids, contact_id).await?;
    Ok(csv_response("contacts.csv", export::export_contacts(&rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{query, test_state};
    use crm_core::BulkStatus;

    fn new_contact(name: &str, email: &str, stage: ContactStage) -> NewContact {
        NewContact {
            name: name.to_string(),
            email: email.to_string(),
            phone: None,
            role: "Facilities Director".to_string(),
            account_id: None,
            stage,
        }
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let state = test_state().await;

        for (name, email, stage) in [
            ("Alice Moreno", "alice@gulfreit.com", ContactStage::Engaged),
            ("Bob Lee", "bob@harbor.com", ContactStage::Identified),
        ] {
            let Json(created) = create_api(
                State(state.clone()),
                Json(new_contact(name, email, stage)),
            )
            .await
            .unwrap();
            assert!(created.success);
        }

        let Json(envelope) = list_api(
            State(state.clone()),
            Query(query(&[("search", "GULF"), ("sort", "name")])),
        )
        .await
        .unwrap();
        let page = envelope.data.unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].name, "Alice Moreno");
        assert_eq!(page.summary.total, 2);
        assert_eq!(page.showing, "Showing 1 of 2 contacts");
    }

    #[tokio::test]
    async fn test_stage_filter_keeps_full_summary() {
        let state = test_state().await;
        for (name, email, stage) in [
            ("Alice Moreno", "alice@gulfreit.com", ContactStage::Engaged),
            ("Bob Lee", "bob@harbor.com", ContactStage::Dormant),
        ] {
            create_api(State(state.clone()), Json(new_contact(name, email, stage)))
                .await
                .unwrap();
        }

        let Json(envelope) = list_api(State(state), Query(query(&[("stage", "Engaged")])))
            .await
            .unwrap();
        let page = envelope.data.unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].name, "Alice Moreno");
        assert_eq!(page.summary.total, 2);
        assert_eq!(page.summary.stage_count("Engaged"), 1);
        assert_eq!(page.summary.stage_count("Dormant"), 1);
        assert_eq!(page.showing, "Showing 1 of 2 contacts");
    }

    #[tokio::test]
    async fn test_record_interaction() {
        let state = test_state().await;
        let Json(created) = create_api(
            State(state.clone()),
            Json(new_contact("Alice", "alice@gulfreit.com", ContactStage::Reached)),
        )
        .await
        .unwrap();
        let id = created.data.unwrap().id;

        let Json(contact) = record_interaction_api(State(state), Path(id)).await.unwrap();
        assert!(contact.last_interaction.is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_bad_email() {
        let state = test_state().await;
        let result = create_api(
            State(state),
            Json(new_contact("Alice", "not-an-email", ContactStage::Identified)),
        )
        .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_bulk_stage_partial() {
        let state = test_state().await;
        let Json(created) = create_api(
            State(state.clone()),
            Json(new_contact("Alice", "alice@gulfreit.com", ContactStage::Identified)),
        )
        .await
        .unwrap();
        let id = created.data.unwrap().id;

        let Json(response) = bulk_stage_api(
            State(state.clone()),
            Json(BulkStageBody {
                ids: vec![id, "missing".to_string()],
                stage: ContactStage::Reached,
            }),
        )
        .await;
        assert_eq!(response.outcome.status, BulkStatus::Partial);
        assert_eq!(response.outcome.message, "Successfully updated 1 contact.");
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].id, "missing");
    }

    #[tokio::test]
    async fn test_bulk_delete_nothing_selected() {
        let state = test_state().await;
        let Json(response) =
            bulk_delete_api(State(state), Json(SelectionBody { ids: vec![] })).await;
        assert_eq!(response.outcome.status, BulkStatus::Failed);
    }
}

//! Properties list endpoints, including CSV export.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use chrono::Utc;
use crm_core::export;
use crm_core::models::{NewProperty, Property, PropertyPatch, PropertyStage};
use crm_core::sort::PropertySortField;
use crm_core::{BulkAction, Envelope, Noun, SortConfig};
use database::property;
use serde::Deserialize;

use super::{csv_response, list_page, selected_rows, BulkResponse, ListResponse, SelectionBody};
use crate::error::Result;
use crate::state::AppState;

fn default_sort() -> SortConfig<PropertySortField> {
    SortConfig::ascending(PropertySortField::Name)
}

fn property_id(property: &Property) -> &str {
    &property.id
}

#[derive(Debug, Deserialize)]
pub struct BulkStageBody {
    pub ids: Vec<String>,
    pub stage: PropertyStage,
}

/// `GET /api/properties?search=&account=&address=&stage=&building_type=&roof_type=&sort=&dir=`
pub async fn list_api(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<ListResponse<Property, PropertySortField>>>> {
    list_page(&state.properties, query, default_sort(), Noun::PROPERTY).await
}

/// `POST /api/properties`
pub async fn create_api(
    State(state): State<AppState>,
    Json(fields): Json<NewProperty>,
) -> Result<Json<Envelope<Property>>> {
    fields.validate()?;
    Ok(Json(state.properties.create(&fields).await))
}

/// `DELETE /api/properties/:id`
pub async fn delete_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Envelope<()>> {
    Json(state.properties.delete(&id).await)
}

/// `POST /api/properties/bulk-stage`
pub async fn bulk_stage_api(
    State(state): State<AppState>,
    Json(body): Json<BulkStageBody>,
) -> Json<BulkResponse> {
    let patch = PropertyPatch {
        stage: Some(body.stage),
        ..PropertyPatch::default()
    };
    let envelope = state.properties.bulk_update(&body.ids, &patch).await;
    Json(BulkResponse::new(BulkAction::Update, Noun::PROPERTY, envelope))
}

/// `POST /api/properties/bulk-delete`
pub async fn bulk_delete_api(
    State(state): State<AppState>,
    Json(body): Json<SelectionBody>,
) -> Json<BulkResponse> {
    let envelope = state.properties.bulk_delete(&body.ids).await;
    Json(BulkResponse::new(BulkAction::Delete, Noun::PROPERTY, envelope))
}

/// `POST /api/properties/:id/assessment`: stamp the assessment time.
pub async fn record_assessment_api(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Property>> {
    let pool = state.db.pool();
    property::record_assessment(pool, &id, Utc::now()).await?;
    Ok(Json(property::get_property(pool, &id).await?))
}

/// `POST /api/properties/export?sort=&dir=`
///
/// Rows come out in list order, not in the order the ids were sent.
pub async fn export_api(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
    Json(body): Json<SelectionBody>,
) -> Result<Response> {
    let rows =
        selected_rows(&state.properties, query, default_sort(), body.ids, property_id).await?;
    tracing::info!(count = rows.len(), "Exporting properties");
    Ok(csv_response("properties.csv", export::export_properties(&rows)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::tests::{query, test_state};
    use axum::http::{header, StatusCode};
    use crm_core::models::{BuildingType, RoofType};
    use crm_core::BulkStatus;

    async fn seed(state: &AppState, name: &str, address: &str) -> String {
        let fields = NewProperty {
            name: name.to_string(),
            address: Some(address.to_string()),
            account_id: None,
            building_type: BuildingType::Warehouse,
            roof_type: RoofType::Tpo,
            stage: PropertyStage::Unassessed,
        };
        let Json(created) = create_api(State(state.clone()), Json(fields)).await.unwrap();
        created.data.unwrap().id
    }

    #[tokio::test]
    async fn test_list_filters_by_address() {
        let state = test_state().await;
        seed(&state, "North Depot", "12 Harbor Rd, Tampa").await;
        seed(&state, "South Depot", "80 Bay St, Miami").await;

        let Json(envelope) = list_api(State(state), Query(query(&[("address", "tampa")])))
            .await
            .unwrap();
        let page = envelope.data.unwrap();
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].name, "North Depot");
        assert_eq!(page.summary.stage_count("Unassessed"), 2);
    }

    #[tokio::test]
    async fn test_bulk_stage_all_succeed() {
        let state = test_state().await;
        let a = seed(&state, "A", "1 Main St").await;
        let b = seed(&state, "B", "2 Main St").await;

        let Json(response) = bulk_stage_api(
            State(state.clone()),
            Json(BulkStageBody {
                ids: vec![a, b],
                stage: PropertyStage::Assessed,
            }),
        )
        .await;
        assert_eq!(response.outcome.status, BulkStatus::Complete);
        assert_eq!(response.outcome.message, "Successfully updated 2 properties.");

        let Json(envelope) = list_api(State(state), Query(query(&[("stage", "Assessed")])))
            .await
            .unwrap();
        assert_eq!(envelope.data.unwrap().rows.len(), 2);
    }

    #[tokio::test]
    async fn test_export_selected_in_list_order() {
        let state = test_state().await;
        let zed = seed(&state, "Zed Plaza", "9 Elm St").await;
        seed(&state, "Middle Mall", "5 Oak St").await;
        let alpha = seed(&state, "Alpha Tower", "1 Pine St").await;

        let response = export_api(
            State(state),
            Query(query(&[])),
            Json(SelectionBody {
                ids: vec![zed, alpha],
            }),
        )
        .await
        .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let csv = String::from_utf8(bytes.to_vec()).unwrap();
        let rows = export::parse_rows(&csv);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0][0], "Name");
        assert_eq!(rows[1][0], "Alpha Tower");
        assert_eq!(rows[2][0], "Zed Plaza");
        assert_eq!(rows[1][6], "Never");
    }

    #[tokio::test]
    async fn test_record_assessment_stamps_date() {
        let state = test_state().await;
        let id = seed(&state, "Harbor Warehouse", "3 Dock Rd").await;

        let Json(property) = record_assessment_api(State(state.clone()), Path(id))
            .await
            .unwrap();
        assert!(property.last_assessment.is_some());

        let result = record_assessment_api(State(state), Path("missing".to_string())).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_export_requires_selection() {
        let state = test_state().await;
        let result = export_api(
            State(state),
            Query(query(&[])),
            Json(SelectionBody { ids: vec![] }),
        )
        .await;
        assert!(result.is_err());
    }
}

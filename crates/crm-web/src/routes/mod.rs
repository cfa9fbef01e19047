//! Route handlers for the CRM web server.

pub mod accounts;
pub mod auth;
pub mod contacts;
pub mod dashboard;
pub mod health;
pub mod properties;

use std::collections::HashMap;
use std::str::FromStr;

use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::Json;
use axum::Router;
use crm_core::models::Staged;
use crm_core::view;
use crm_core::{
    BulkAction, BulkCount, BulkFailure, BulkOutcome, CoreError, Envelope, EntityStore,
    FilterCriteria, Filterable, Noun, RepositoryAdapter, SelectionTracker, SortConfig,
    SortDirection, Sortable, Summary, ValidationError,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WebError};
use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // HTML pages
        .route("/", get(dashboard::dashboard_page))
        // Health check
        .route("/health", get(health::health))
        // API endpoints
        .route("/api/stats", get(dashboard::stats_api))
        .route("/api/session", get(dashboard::session_api))
        .route(
            "/api/contacts",
            get(contacts::list_api).post(contacts::create_api),
        )
        .route("/api/contacts/:id", delete(contacts::delete_api))
        .route("/api/contacts/bulk-stage", post(contacts::bulk_stage_api))
        .route("/api/contacts/bulk-delete", post(contacts::bulk_delete_api))
        .route("/api/contacts/export", post(contacts::export_api))
        .route(
            "/api/contacts/:id/interaction",
            post(contacts::record_interaction_api),
        )
        .route(
            "/api/properties",
            get(properties::list_api).post(properties::create_api),
        )
        .route("/api/properties/:id", delete(properties::delete_api))
        .route("/api/properties/bulk-stage", post(properties::bulk_stage_api))
        .route("/api/properties/bulk-delete", post(properties::bulk_delete_api))
        .route("/api/properties/export", post(properties::export_api))
        .route(
            "/api/properties/:id/assessment",
            post(properties::record_assessment_api),
        )
        .route(
            "/api/accounts",
            get(accounts::list_api).post(accounts::create_api),
        )
        .route("/api/accounts/:id/reps", put(accounts::assign_reps_api))
        .route("/api/reps", get(accounts::reps_api))
        // Auth redirects
        .route("/auth/callback", get(auth::callback_api))
        .route("/auth/recovery", get(auth::recovery_api))
}

/// Rows of one list page plus its summary.
#[derive(Debug, Serialize)]
pub struct ListResponse<T, F> {
    pub rows: Vec<T>,
    pub summary: Summary,
    pub showing: String,
    pub sort: SortConfig<F>,
}

/// Ids picked by the user for a bulk action.
#[derive(Debug, Deserialize)]
pub struct SelectionBody {
    pub ids: Vec<String>,
}

/// Bulk action result: banner text plus per-id failures.
#[derive(Debug, Serialize)]
pub struct BulkResponse {
    #[serde(flatten)]
    pub outcome: BulkOutcome,
    pub failed: Vec<BulkFailure>,
}

impl BulkResponse {
    pub fn new(action: BulkAction, noun: Noun, envelope: Envelope<BulkCount>) -> Self {
        let outcome = BulkOutcome::from_envelope(action, noun, &envelope);
        let failed = envelope.data.map(|count| count.failed).unwrap_or_default();
        if !failed.is_empty() {
            tracing::warn!(
                noun = noun.plural,
                failed = failed.len(),
                "Bulk action partially failed"
            );
        }
        Self { outcome, failed }
    }
}

/// Split `sort` and `dir` out of a list query; the rest are filters.
pub(crate) fn parse_list_query<F>(
    mut query: HashMap<String, String>,
    default_sort: SortConfig<F>,
) -> Result<(FilterCriteria, SortConfig<F>)>
where
    F: FromStr<Err = CoreError> + Copy + PartialEq,
{
    let field = match query.remove("sort").filter(|s| !s.is_empty()) {
        Some(name) => name.parse()?,
        None => default_sort.field,
    };
    let direction = match query.remove("dir").filter(|s| !s.is_empty()) {
        Some(dir) => dir.parse()?,
        None if field == default_sort.field => default_sort.direction,
        None => SortDirection::Ascending,
    };

    let criteria = FilterCriteria::from_pairs(query)?;
    Ok((criteria, SortConfig::new(field, direction)))
}

/// Fetch through the adapter and derive the page.
///
/// The whole collection is fetched so the summary counts every record, not
/// just the ones the filter lets through.
pub(crate) async fn list_page<S>(
    adapter: &RepositoryAdapter<S>,
    query: HashMap<String, String>,
    default_sort: SortConfig<<S::Entity as Sortable>::Field>,
    noun: Noun,
) -> Result<Json<Envelope<ListResponse<S::Entity, <S::Entity as Sortable>::Field>>>>
where
    S: EntityStore,
    S::Entity: Filterable + Sortable + Staged + Clone,
    <S::Entity as Sortable>::Field: FromStr<Err = CoreError>,
{
    let (criteria, sort) = parse_list_query(query, default_sort)?;
    let envelope = adapter.list(&FilterCriteria::new()).await;

    Ok(Json(envelope.map(|records| {
        let snapshot = view::derive(&records, &criteria, &sort);
        ListResponse {
            showing: snapshot.summary.showing(noun.plural),
            rows: snapshot.rows,
            summary: snapshot.summary,
            sort,
        }
    })))
}

/// Selected records in the order the list is sorted by.
///
/// Filters in `query` are ignored, so every selected id that still exists
/// comes back even if the current filter hides it.
pub(crate) async fn selected_rows<S>(
    adapter: &RepositoryAdapter<S>,
    query: HashMap<String, String>,
    default_sort: SortConfig<<S::Entity as Sortable>::Field>,
    ids: Vec<String>,
    id_of: fn(&S::Entity) -> &str,
) -> Result<Vec<S::Entity>>
where
    S: EntityStore,
    S::Entity: Filterable + Sortable + Staged + Clone,
    <S::Entity as Sortable>::Field: FromStr<Err = CoreError>,
{
    if ids.is_empty() {
        return Err(ValidationError::Empty("selection".to_string()).into());
    }

    let (_, sort) = parse_list_query(query, default_sort)?;
    let everything = FilterCriteria::new();
    let records = adapter
        .list(&everything)
        .await
        .into_result()
        .map_err(WebError::Internal)?;
    let snapshot = view::derive(&records, &everything, &sort);

    let mut selection = SelectionTracker::new();
    selection.select_all(ids);

    Ok(selection
        .visible_selection(&snapshot.rows, id_of)
        .into_iter()
        .cloned()
        .collect())
}

/// CSV download response.
pub(crate) fn csv_response(filename: &str, body: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        body,
    )
        .into_response()
}

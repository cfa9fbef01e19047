//! Accounts list and rep assignment endpoints.

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use crm_core::assignment::AssignmentDraft;
use crm_core::models::{Account, NewAccount, Representative};
use crm_core::sort::AccountSortField;
use crm_core::{Envelope, Noun, SortConfig};
use database::{account, rep};
use serde::Deserialize;

use super::{list_page, ListResponse};
use crate::error::Result;
use crate::state::AppState;

/// Body of a rep assignment change.
///
/// Without `primary`, the first listed rep becomes primary.
#[derive(Debug, Deserialize)]
pub struct AssignRepsBody {
    pub rep_ids: Vec<String>,
    #[serde(default)]
    pub primary: Option<String>,
}

/// `GET /api/accounts?search=&stage=&sort=&dir=`
pub async fn list_api(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Envelope<ListResponse<Account, AccountSortField>>>> {
    list_page(
        &state.accounts,
        query,
        SortConfig::ascending(AccountSortField::Name),
        Noun::ACCOUNT,
    )
    .await
}

/// `POST /api/accounts`
pub async fn create_api(
    State(state): State<AppState>,
    Json(fields): Json<NewAccount>,
) -> Result<Json<Envelope<Account>>> {
    fields.validate()?;
    Ok(Json(state.accounts.create(&fields).await))
}

/// `PUT /api/accounts/:id/reps`
pub async fn assign_reps_api(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(body): Json<AssignRepsBody>,
) -> Result<Json<Account>> {
    let pool = state.db.pool();
    account::get_account(pool, &account_id).await?;

    let mut draft = AssignmentDraft::new();
    for rep_id in &body.rep_ids {
        if draft.is_selected(rep_id) {
            continue;
        }
        let rep = rep::get_rep(pool, rep_id).await?;
        draft.toggle_rep(&rep);
    }
    if let Some(primary) = &body.primary {
        draft.set_primary(primary)?;
    }

    account::set_account_reps(pool, &account_id, &draft.finalize()).await?;
    Ok(Json(account::get_account(pool, &account_id).await?))
}

/// `GET /api/reps`
pub async fn reps_api(State(state): State<AppState>) -> Result<Json<Vec<Representative>>> {
    Ok(Json(rep::list_reps(state.db.pool()).await?))
}

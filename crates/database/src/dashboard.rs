//! Aggregates behind the manager dashboard.

use chrono::{Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::Result;

/// Days counted as "recent" for interaction activity.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Count for one stage label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub stage: String,
    pub count: i64,
}

/// Workload of one representative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepLoad {
    pub rep_name: String,
    pub accounts: i64,
    pub primary_accounts: i64,
}

/// Everything the manager dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagerMetrics {
    pub total_contacts: i64,
    pub total_properties: i64,
    pub total_accounts: i64,
    pub recent_interactions: i64,
    pub contacts_by_stage: Vec<StageCount>,
    pub properties_by_stage: Vec<StageCount>,
    pub accounts_by_stage: Vec<StageCount>,
    pub rep_loads: Vec<RepLoad>,
}

/// Compute the manager dashboard figures.
pub async fn manager_metrics(pool: &SqlitePool) -> Result<ManagerMetrics> {
    let contacts_by_stage = stage_counts(crate::contact::count_contacts_by_stage(pool).await?);
    let properties_by_stage = stage_counts(crate::property::count_properties_by_stage(pool).await?);
    let accounts_by_stage = stage_counts(crate::account::count_accounts_by_stage(pool).await?);

    let since = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
    let recent_interactions = crate::contact::count_recent_interactions(pool, since).await?;

    let rep_loads = crate::rep::count_accounts_per_rep(pool)
        .await?
        .into_iter()
        .map(|(rep_name, accounts, primary_accounts)| RepLoad {
            rep_name,
            accounts,
            primary_accounts,
        })
        .collect();

    Ok(ManagerMetrics {
        total_contacts: crate::contact::count_contacts(pool).await?,
        total_properties: total(&properties_by_stage),
        total_accounts: total(&accounts_by_stage),
        recent_interactions,
        contacts_by_stage,
        properties_by_stage,
        accounts_by_stage,
        rep_loads,
    })
}

fn stage_counts(rows: Vec<(String, i64)>) -> Vec<StageCount> {
    rows.into_iter()
        .map(|(stage, count)| StageCount { stage, count })
        .collect()
}

fn total(counts: &[StageCount]) -> i64 {
    counts.iter().map(|c| c.count).sum()
}

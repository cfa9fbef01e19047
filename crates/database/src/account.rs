//! Account and rep-assignment operations.

use std::collections::HashMap;

use crm_core::assignment::validate_assignments;
use crm_core::models::{Account, AccountPatch, NewAccount, RepAssignment};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{AccountRow, AssignmentRow};

/// List all accounts with their rep assignments, ordered by name.
pub async fn list_accounts(pool: &SqlitePool) -> Result<Vec<Account>> {
    let rows = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, name, company_type, city, state, stage
        FROM accounts
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut by_account: HashMap<String, Vec<RepAssignment>> = HashMap::new();
    for row in list_all_assignments(pool).await? {
        by_account
            .entry(row.account_id.clone())
            .or_default()
            .push(row.into_assignment());
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let reps = by_account.remove(&row.id).unwrap_or_default();
            row.into_account(reps)
        })
        .collect())
}

/// Get an account by ID, with its rep assignments.
pub async fn get_account(pool: &SqlitePool, id: &str) -> Result<Account> {
    let row = sqlx::query_as::<_, AccountRow>(
        r#"
        SELECT id, name, company_type, city, state, stage
        FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Account",
        id: id.to_string(),
    })?;

    let reps = list_assignments(pool, id).await?;
    Ok(row.into_account(reps))
}

/// Create an account and return it as stored.
pub async fn create_account(pool: &SqlitePool, fields: &NewAccount) -> Result<Account> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO accounts (id, name, company_type, city, state, stage)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(fields.name.trim())
    .bind(&fields.company_type)
    .bind(fields.city.as_deref())
    .bind(fields.state.as_deref())
    .bind(fields.stage.label())
    .execute(pool)
    .await?;

    get_account(pool, &id).await
}

/// Apply a partial update; absent patch fields keep their value.
pub async fn update_account(pool: &SqlitePool, id: &str, patch: &AccountPatch) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE accounts
        SET stage = COALESCE(?, stage), company_type = COALESCE(?, company_type)
        WHERE id = ?
        "#,
    )
    .bind(patch.stage.map(|s| s.label()))
    .bind(patch.company_type.as_deref())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Account",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete an account by ID. Its assignments go with it.
pub async fn delete_account(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Account",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Rep assignments of one account, in assignment order.
pub async fn list_assignments(pool: &SqlitePool, account_id: &str) -> Result<Vec<RepAssignment>> {
    let rows = sqlx::query_as::<_, AssignmentRow>(
        r#"
        SELECT ar.account_id, ar.rep_id, r.name AS rep_name, ar.is_primary
        FROM account_reps ar
        JOIN representatives r ON r.id = ar.rep_id
        WHERE ar.account_id = ?
        ORDER BY ar.position
        "#,
    )
    .bind(account_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(AssignmentRow::into_assignment).collect())
}

async fn list_all_assignments(pool: &SqlitePool) -> Result<Vec<AssignmentRow>> {
    let rows = sqlx::query_as::<_, AssignmentRow>(
        r#"
        SELECT ar.account_id, ar.rep_id, r.name AS rep_name, ar.is_primary
        FROM account_reps ar
        JOIN representatives r ON r.id = ar.rep_id
        ORDER BY ar.account_id, ar.position
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Replace an account's rep assignments.
///
/// The list must satisfy the primary-rep rule; it is written in one
/// transaction, so readers never see a half-applied assignment.
pub async fn set_account_reps(
    pool: &SqlitePool,
    account_id: &str,
    assignments: &[RepAssignment],
) -> Result<()> {
    validate_assignments(assignments)?;

    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE id = ?")
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Account",
            id: account_id.to_string(),
        });
    }

    sqlx::query("DELETE FROM account_reps WHERE account_id = ?")
        .bind(account_id)
        .execute(&mut *tx)
        .await?;

    for (position, assignment) in assignments.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO account_reps (account_id, rep_id, is_primary, position)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(account_id)
        .bind(&assignment.rep_id)
        .bind(assignment.is_primary)
        .bind(position as i64)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.is_foreign_key_violation() {
                    return DatabaseError::NotFound {
                        entity: "Representative",
                        id: assignment.rep_id.clone(),
                    };
                }
            }
            DatabaseError::Sqlx(e)
        })?;
    }

    tx.commit().await?;

    tracing::info!(
        account_id,
        reps = assignments.len(),
        "Updated account rep assignments"
    );
    Ok(())
}

/// Count accounts grouped by stage.
pub async fn count_accounts_by_stage(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT stage, COUNT(*) as count
        FROM accounts
        GROUP BY stage
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

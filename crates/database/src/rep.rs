//! Representative roster operations.

use crm_core::models::Representative;
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::RepresentativeRow;

/// Add a representative to the roster.
pub async fn create_rep(pool: &SqlitePool, name: &str, email: &str) -> Result<Representative> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO representatives (id, name, email)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(name)
    .bind(email)
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Representative",
                    id: email.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    Ok(Representative {
        id,
        name: name.to_string(),
        email: email.to_string(),
    })
}

/// Get a representative by ID.
pub async fn get_rep(pool: &SqlitePool, id: &str) -> Result<Representative> {
    sqlx::query_as::<_, RepresentativeRow>(
        r#"
        SELECT id, name, email
        FROM representatives
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .map(Representative::from)
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Representative",
        id: id.to_string(),
    })
}

/// List all representatives.
pub async fn list_reps(pool: &SqlitePool) -> Result<Vec<Representative>> {
    let rows = sqlx::query_as::<_, RepresentativeRow>(
        r#"
        SELECT id, name, email
        FROM representatives
        ORDER BY name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Representative::from).collect())
}

/// Accounts per rep, counting every assignment (primary or not).
pub async fn count_accounts_per_rep(pool: &SqlitePool) -> Result<Vec<(String, i64, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64, i64)>(
        r#"
        SELECT r.name,
               COUNT(ar.account_id) as accounts,
               COALESCE(SUM(ar.is_primary), 0) as primary_accounts
        FROM representatives r
        LEFT JOIN account_reps ar ON ar.rep_id = r.id
        GROUP BY r.id
        ORDER BY accounts DESC, r.name
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

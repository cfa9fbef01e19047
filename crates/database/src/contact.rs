//! Contact CRUD operations.

use chrono::{DateTime, Utc};
use crm_core::models::{Contact, ContactPatch, NewContact};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{format_timestamp, ContactRow};

const SELECT_CONTACTS: &str = r#"
    SELECT c.id, c.name, c.email, c.phone, c.role, c.account_id,
           a.name AS account_name, c.stage, c.last_interaction, c.created_at
    FROM contacts c
    LEFT JOIN accounts a ON a.id = c.account_id
"#;

/// List all contacts ordered by name.
///
/// Filtering happens in the list view, after unknown stages have been
/// mapped to their fallback.
pub async fn list_contacts(pool: &SqlitePool) -> Result<Vec<Contact>> {
    let query = format!("{SELECT_CONTACTS} ORDER BY c.name");
    let rows = sqlx::query_as::<_, ContactRow>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(ContactRow::into_contact).collect())
}

/// Get a contact by ID.
pub async fn get_contact(pool: &SqlitePool, id: &str) -> Result<Contact> {
    let query = format!("{SELECT_CONTACTS} WHERE c.id = ?");
    sqlx::query_as::<_, ContactRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(ContactRow::into_contact)
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Contact",
            id: id.to_string(),
        })
}

/// Create a contact and return it as stored.
pub async fn create_contact(pool: &SqlitePool, fields: &NewContact) -> Result<Contact> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO contacts (id, name, email, phone, role, account_id, stage, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(fields.name.trim())
    .bind(fields.email.trim())
    .bind(fields.phone.as_deref())
    .bind(&fields.role)
    .bind(fields.account_id.as_deref())
    .bind(fields.stage.label())
    .bind(format_timestamp(Utc::now()))
    .execute(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Contact",
                    id: id.clone(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })?;

    get_contact(pool, &id).await
}

/// Apply a partial update; absent patch fields keep their value.
pub async fn update_contact(pool: &SqlitePool, id: &str, patch: &ContactPatch) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE contacts
        SET stage = COALESCE(?, stage), role = COALESCE(?, role)
        WHERE id = ?
        "#,
    )
    .bind(patch.stage.map(|s| s.label()))
    .bind(patch.role.as_deref())
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Contact",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Stamp the contact's last interaction time.
pub async fn record_interaction(pool: &SqlitePool, id: &str, at: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE contacts
        SET last_interaction = ?
        WHERE id = ?
        "#,
    )
    .bind(format_timestamp(at))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Contact",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a contact by ID.
pub async fn delete_contact(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM contacts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Contact",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count total contacts.
pub async fn count_contacts(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM contacts
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Count contacts grouped by stage.
pub async fn count_contacts_by_stage(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT stage, COUNT(*) as count
        FROM contacts
        GROUP BY stage
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Count contacts touched since `since`.
pub async fn count_recent_interactions(pool: &SqlitePool, since: DateTime<Utc>) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM contacts
        WHERE last_interaction IS NOT NULL AND last_interaction >= ?
        "#,
    )
    .bind(format_timestamp(since))
    .fetch_one(pool)
    .await?;

    Ok(count)
}

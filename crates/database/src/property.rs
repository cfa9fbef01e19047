//! Property CRUD operations.

use chrono::{DateTime, Utc};
use crm_core::models::{NewProperty, Property, PropertyPatch};
use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{format_timestamp, PropertyRow};

const SELECT_PROPERTIES: &str = r#"
    SELECT p.id, p.name, p.address, p.account_id, a.name AS account_name,
           p.building_type, p.roof_type, p.stage, p.last_assessment
    FROM properties p
    LEFT JOIN accounts a ON a.id = p.account_id
"#;

/// List all properties ordered by name.
pub async fn list_properties(pool: &SqlitePool) -> Result<Vec<Property>> {
    let query = format!("{SELECT_PROPERTIES} ORDER BY p.name");
    let rows = sqlx::query_as::<_, PropertyRow>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(PropertyRow::into_property).collect())
}

/// Get a property by ID.
pub async fn get_property(pool: &SqlitePool, id: &str) -> Result<Property> {
    let query = format!("{SELECT_PROPERTIES} WHERE p.id = ?");
    sqlx::query_as::<_, PropertyRow>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .map(PropertyRow::into_property)
        .ok_or_else(|| DatabaseError::NotFound {
            entity: "Property",
            id: id.to_string(),
        })
}

/// Create a property and return it as stored.
pub async fn create_property(pool: &SqlitePool, fields: &NewProperty) -> Result<Property> {
    let id = uuid::Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO properties (id, name, address, account_id, building_type, roof_type, stage)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(fields.name.trim())
    .bind(fields.address.as_deref())
    .bind(fields.account_id.as_deref())
    .bind(fields.building_type.label())
    .bind(fields.roof_type.label())
    .bind(fields.stage.label())
    .execute(pool)
    .await?;

    get_property(pool, &id).await
}

/// Apply a partial update; absent patch fields keep their value.
pub async fn update_property(pool: &SqlitePool, id: &str, patch: &PropertyPatch) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE properties
        SET stage = COALESCE(?, stage),
            building_type = COALESCE(?, building_type),
            roof_type = COALESCE(?, roof_type)
        WHERE id = ?
        "#,
    )
    .bind(patch.stage.map(|s| s.label()))
    .bind(patch.building_type.map(|b| b.label()))
    .bind(patch.roof_type.map(|r| r.label()))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Property",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Stamp the property's last assessment time.
pub async fn record_assessment(pool: &SqlitePool, id: &str, at: DateTime<Utc>) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE properties
        SET last_assessment = ?
        WHERE id = ?
        "#,
    )
    .bind(format_timestamp(at))
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Property",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a property by ID.
pub async fn delete_property(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM properties
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Property",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Count properties grouped by stage.
pub async fn count_properties_by_stage(pool: &SqlitePool) -> Result<Vec<(String, i64)>> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        r#"
        SELECT stage, COUNT(*) as count
        FROM properties
        GROUP BY stage
        ORDER BY count DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

//! Hazard type and hazard category queries

use hazard_common::db::{CategoryAssociation, CategoryKey, HazardCategory, HazardType};
use hazard_common::{Error, Result};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::level_column;

const CATEGORY_SELECT: &str = r#"
    SELECT c.id,
           t.mnemonic AS hazard_type,
           t.title AS hazard_type_title,
           l.mnemonic AS hazard_level,
           c.general_recommendation
    FROM hazard_categories c
    JOIN hazard_types t ON t.id = c.hazard_type_id
    JOIN hazard_levels l ON l.id = c.hazard_level_id
"#;

fn category_from_row(row: &SqliteRow) -> std::result::Result<HazardCategory, sqlx::Error> {
    Ok(HazardCategory {
        id: row.try_get("id")?,
        key: CategoryKey::new(
            row.try_get::<String, _>("hazard_type")?,
            level_column(row, "hazard_level")?,
        ),
        hazard_type_title: row.try_get("hazard_type_title")?,
        general_recommendation: row.try_get("general_recommendation")?,
    })
}

/// All hazard types in display order
pub async fn list_hazard_types(conn: &mut SqliteConnection) -> Result<Vec<HazardType>> {
    let rows = sqlx::query(r#"SELECT id, mnemonic, title, "order" FROM hazard_types ORDER BY "order", id"#)
        .fetch_all(&mut *conn)
        .await?;

    let hazard_types = rows
        .iter()
        .map(|row| {
            Ok(HazardType {
                id: row.try_get("id")?,
                mnemonic: row.try_get("mnemonic")?,
                title: row.try_get("title")?,
                order: row.try_get("order")?,
            })
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

    Ok(hazard_types)
}

/// Resolve the unique category for a (type, level) pair
pub async fn find_category_by_key(
    conn: &mut SqliteConnection,
    key: &CategoryKey,
) -> Result<HazardCategory> {
    let sql = format!("{} WHERE t.mnemonic = ? AND l.mnemonic = ?", CATEGORY_SELECT);
    let row = sqlx::query(&sql)
        .bind(&key.hazard_type)
        .bind(key.hazard_level.mnemonic())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::not_found("Hazard category", key))?;

    Ok(category_from_row(&row)?)
}

/// Load a category by its identifier
pub async fn get_category(conn: &mut SqliteConnection, id: i64) -> Result<HazardCategory> {
    let sql = format!("{} WHERE c.id = ?", CATEGORY_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::not_found("Hazard category", id))?;

    Ok(category_from_row(&row)?)
}

pub async fn update_general_recommendation(
    conn: &mut SqliteConnection,
    category_id: i64,
    text: &str,
) -> Result<()> {
    sqlx::query("UPDATE hazard_categories SET general_recommendation = ? WHERE id = ?")
        .bind(text)
        .bind(category_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

/// Associations of a category with their recommendation text, by `order`
pub async fn list_category_associations(
    conn: &mut SqliteConnection,
    category_id: i64,
) -> Result<Vec<CategoryAssociation>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a."order", a.technicalrecommendation_id, r.text
        FROM hazardcategory_technicalrecommendation a
        JOIN technical_recommendations r ON r.id = a.technicalrecommendation_id
        WHERE a.hazardcategory_id = ?
        ORDER BY a."order" ASC, a.id ASC
        "#,
    )
    .bind(category_id)
    .fetch_all(&mut *conn)
    .await?;

    let associations = rows
        .iter()
        .map(|row| {
            Ok(CategoryAssociation {
                id: row.try_get("id")?,
                order: row.try_get("order")?,
                technicalrecommendation_id: row.try_get("technicalrecommendation_id")?,
                text: row.try_get("text")?,
            })
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

    Ok(associations)
}

/// Assign `order` = 1..N following the given association ids
///
/// Full resequencing: each id gets its position in the slice, whatever its
/// previous value was. Ids are not checked against a category. An id that
/// matches no association fails the whole call.
pub async fn resequence_associations(
    conn: &mut SqliteConnection,
    association_ids: &[i64],
) -> Result<()> {
    for (index, association_id) in association_ids.iter().enumerate() {
        let order = index as i64 + 1;
        let updated = sqlx::query(
            r#"UPDATE hazardcategory_technicalrecommendation SET "order" = ? WHERE id = ?"#,
        )
        .bind(order)
        .bind(association_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();

        if updated == 0 {
            return Err(Error::not_found("Association", association_id));
        }
    }

    Ok(())
}

/// Next free `order` in a category: max + 1, or 1 when it has none
pub async fn next_association_order(conn: &mut SqliteConnection, category_id: i64) -> Result<i64> {
    let max: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT MAX(CAST("order" AS INTEGER))
        FROM hazardcategory_technicalrecommendation
        WHERE hazardcategory_id = ?
        "#,
    )
    .bind(category_id)
    .fetch_one(&mut *conn)
    .await?;

    Ok(max.unwrap_or(0) + 1)
}

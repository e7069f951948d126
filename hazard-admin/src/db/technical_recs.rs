//! Technical recommendation and association queries

use hazard_common::db::{CategoryKey, RecommendationAssociation, TechnicalRecommendation};
use hazard_common::{Error, Result};
use sqlx::{Row, SqliteConnection};

use super::level_column;

/// Recommendation with the names of its linked categories
#[derive(Debug, Clone)]
pub struct TechnicalRecSummary {
    pub id: i64,
    pub text: String,
    pub hazard_categories: Vec<CategoryKey>,
}

/// All recommendations by id, each with its linked category keys
pub async fn list_technical_recs(conn: &mut SqliteConnection) -> Result<Vec<TechnicalRecSummary>> {
    let rows = sqlx::query("SELECT id, text FROM technical_recommendations ORDER BY id")
        .fetch_all(&mut *conn)
        .await?;

    let mut summaries = Vec::with_capacity(rows.len());
    for row in rows {
        let id: i64 = row.try_get("id")?;
        let hazard_categories = list_recommendation_associations(conn, id)
            .await?
            .into_iter()
            .map(|association| association.key)
            .collect();

        summaries.push(TechnicalRecSummary {
            id,
            text: row.try_get("text")?,
            hazard_categories,
        });
    }

    Ok(summaries)
}

pub async fn get_technical_rec(conn: &mut SqliteConnection, id: i64) -> Result<TechnicalRecommendation> {
    let text: String = sqlx::query_scalar("SELECT text FROM technical_recommendations WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| Error::not_found("Technical recommendation", id))?;

    Ok(TechnicalRecommendation { id: Some(id), text })
}

/// Persist the recommendation text, inserting it first if it is transient
///
/// Returns the identifier, which is assigned here for new recommendations.
pub async fn save_technical_rec(
    conn: &mut SqliteConnection,
    rec: &mut TechnicalRecommendation,
) -> Result<i64> {
    match rec.id {
        Some(id) => {
            sqlx::query("UPDATE technical_recommendations SET text = ? WHERE id = ?")
                .bind(&rec.text)
                .bind(id)
                .execute(&mut *conn)
                .await?;
            Ok(id)
        }
        None => {
            let id = sqlx::query("INSERT INTO technical_recommendations (text) VALUES (?)")
                .bind(&rec.text)
                .execute(&mut *conn)
                .await?
                .last_insert_rowid();
            rec.id = Some(id);
            Ok(id)
        }
    }
}

/// Associations of a recommendation, ordered by category
pub async fn list_recommendation_associations(
    conn: &mut SqliteConnection,
    technicalrecommendation_id: i64,
) -> Result<Vec<RecommendationAssociation>> {
    let rows = sqlx::query(
        r#"
        SELECT a.id, a.hazardcategory_id, a."order",
               t.mnemonic AS hazard_type, l.mnemonic AS hazard_level
        FROM hazardcategory_technicalrecommendation a
        JOIN hazard_categories c ON c.id = a.hazardcategory_id
        JOIN hazard_types t ON t.id = c.hazard_type_id
        JOIN hazard_levels l ON l.id = c.hazard_level_id
        WHERE a.technicalrecommendation_id = ?
        ORDER BY t."order", l."order"
        "#,
    )
    .bind(technicalrecommendation_id)
    .fetch_all(&mut *conn)
    .await?;

    let associations = rows
        .iter()
        .map(|row| {
            Ok(RecommendationAssociation {
                id: row.try_get("id")?,
                hazardcategory_id: row.try_get("hazardcategory_id")?,
                key: CategoryKey::new(
                    row.try_get::<String, _>("hazard_type")?,
                    level_column(row, "hazard_level")?,
                ),
                order: row.try_get("order")?,
            })
        })
        .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

    Ok(associations)
}

pub async fn insert_association(
    conn: &mut SqliteConnection,
    hazardcategory_id: i64,
    technicalrecommendation_id: i64,
    order: i64,
) -> Result<i64> {
    let id = sqlx::query(
        r#"
        INSERT INTO hazardcategory_technicalrecommendation
            (hazardcategory_id, technicalrecommendation_id, "order")
        VALUES (?, ?, ?)
        "#,
    )
    .bind(hazardcategory_id)
    .bind(technicalrecommendation_id)
    .bind(order)
    .execute(&mut *conn)
    .await?
    .last_insert_rowid();

    Ok(id)
}

pub async fn delete_association(conn: &mut SqliteConnection, association_id: i64) -> Result<()> {
    sqlx::query("DELETE FROM hazardcategory_technicalrecommendation WHERE id = ?")
        .bind(association_id)
        .execute(&mut *conn)
        .await?;

    Ok(())
}

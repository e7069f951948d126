//! Technical recommendation editor
//!
//! The same form serves creation (`/technical_rec/new`, transient
//! recommendation) and editing (`/technical_rec/:id`).

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::Form;
use hazard_common::db::{CategoryKey, TechnicalRecommendation};
use hazard_common::Error;
use serde::Deserialize;
use sqlx::SqliteConnection;
use tracing::info;

use crate::reconcile::save_with_associations;
use crate::templates::{
    category_grid, level_headers, TechnicalRecFormTemplate, TechnicalRecIndexTemplate,
    TechnicalRecRow,
};
use crate::{db, ApiResult, AppState};

/// Form posted by the recommendation editor
#[derive(Debug, Deserialize)]
pub struct TechnicalRecForm {
    #[serde(default)]
    pub text: Option<String>,
    /// Checked categories as `"<TYPE> - <LEVEL>"` tokens
    #[serde(default)]
    pub associations: Vec<String>,
}

/// Path ids are digits only; anything else names no recommendation
fn parse_rec_id(raw: &str) -> Result<i64, Error> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::not_found("Technical recommendation", raw));
    }
    raw.parse()
        .map_err(|_| Error::not_found("Technical recommendation", raw))
}

fn edit_path(id: i64) -> String {
    format!("/technical_rec/{}", id)
}

/// GET /technical_rec
pub async fn list_technical_recs(
    State(state): State<AppState>,
) -> ApiResult<TechnicalRecIndexTemplate> {
    let mut conn = state.db.acquire().await?;
    let technical_recs = db::list_technical_recs(&mut conn)
        .await?
        .into_iter()
        .map(TechnicalRecRow::from)
        .collect();

    Ok(TechnicalRecIndexTemplate { technical_recs })
}

/// Build the form page for a transient or persisted recommendation
async fn render_form(
    conn: &mut SqliteConnection,
    obj: TechnicalRecommendation,
) -> ApiResult<TechnicalRecFormTemplate> {
    let hazard_types = db::list_hazard_types(conn).await?;

    let (action, checked) = match obj.id {
        None => ("/technical_rec/new".to_string(), Vec::new()),
        Some(id) => {
            let checked: Vec<CategoryKey> = db::list_recommendation_associations(conn, id)
                .await?
                .into_iter()
                .map(|association| association.key)
                .collect();
            (edit_path(id), checked)
        }
    };

    Ok(TechnicalRecFormTemplate {
        obj,
        action,
        hazard_levels: level_headers(),
        rows: category_grid(&hazard_types, &checked),
    })
}

/// GET /technical_rec/new
pub async fn load_new_technical_rec_form(
    State(state): State<AppState>,
) -> ApiResult<TechnicalRecFormTemplate> {
    let mut conn = state.db.acquire().await?;
    render_form(&mut conn, TechnicalRecommendation::transient()).await
}

/// GET /technical_rec/:id
pub async fn load_edit_technical_rec_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<TechnicalRecFormTemplate> {
    let id = parse_rec_id(&raw_id)?;
    let mut conn = state.db.acquire().await?;
    let obj = db::get_technical_rec(&mut conn, id).await?;
    render_form(&mut conn, obj).await
}

/// POST /technical_rec/new
pub async fn submit_new_technical_rec(
    State(state): State<AppState>,
    Form(form): Form<TechnicalRecForm>,
) -> ApiResult<Redirect> {
    let mut tx = state.db.begin().await?;

    let mut obj = TechnicalRecommendation::transient();
    let id = save_with_associations(
        &mut tx,
        &mut obj,
        form.text.unwrap_or_default(),
        &form.associations,
    )
    .await?;

    tx.commit().await?;
    info!("Created technical recommendation {}", id);

    Ok(Redirect::to(&edit_path(id)))
}

/// POST /technical_rec/:id
pub async fn submit_edit_technical_rec(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Form(form): Form<TechnicalRecForm>,
) -> ApiResult<Redirect> {
    let id = parse_rec_id(&raw_id)?;
    let mut tx = state.db.begin().await?;

    let mut obj = db::get_technical_rec(&mut tx, id).await?;
    let id = save_with_associations(
        &mut tx,
        &mut obj,
        form.text.unwrap_or_default(),
        &form.associations,
    )
    .await?;

    tx.commit().await?;
    info!("Updated technical recommendation {}", id);

    Ok(Redirect::to(&edit_path(id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rec_id() {
        assert_eq!(parse_rec_id("42").unwrap(), 42);
        for raw in ["", "abc", "-1", "+1", " 1", "99999999999999999999"] {
            assert!(
                matches!(parse_rec_id(raw), Err(Error::NotFound { .. })),
                "{:?}",
                raw
            );
        }
    }
}

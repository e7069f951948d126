//! Hazard category editor: general recommendation text and the ordering of
//! linked technical recommendations

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use axum_extra::extract::Form;
use hazard_common::db::{CategoryKey, HazardLevel};
use hazard_common::Error;
use serde::Deserialize;
use tracing::info;

use crate::templates::{category_path, HazardCategoryTemplate};
use crate::{db, ApiResult, AppState};

/// Form posted by the category editor
#[derive(Debug, Deserialize)]
pub struct HazardCategoryForm {
    pub id: String,
    #[serde(default)]
    pub general_recommendation: Option<String>,
    /// Association ids in the desired display order
    #[serde(default)]
    pub associations: Vec<String>,
}

/// Resolve path mnemonics into a key; unknown levels are "not found"
fn path_key(hazard_type: &str, hazard_level: &str) -> Result<CategoryKey, Error> {
    let level = HazardLevel::from_mnemonic(hazard_level).ok_or_else(|| {
        Error::not_found("Hazard category", format!("{} - {}", hazard_type, hazard_level))
    })?;
    Ok(CategoryKey::new(hazard_type, level))
}

fn parse_id(field: &str, value: &str) -> Result<i64, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidInput(format!("{} must be an integer, got {:?}", field, value)))
}

/// GET /:hazard_type/:hazard_level
pub async fn load_hazard_category_form(
    State(state): State<AppState>,
    Path((hazard_type, hazard_level)): Path<(String, String)>,
) -> ApiResult<HazardCategoryTemplate> {
    let key = path_key(&hazard_type, &hazard_level)?;

    let mut conn = state.db.acquire().await?;
    let hazard_category = db::find_category_by_key(&mut conn, &key).await?;
    let associations = db::list_category_associations(&mut conn, hazard_category.id).await?;

    Ok(HazardCategoryTemplate {
        action: category_path(&key),
        name: hazard_category.name(),
        hazard_category,
        associations,
    })
}

/// POST /:hazard_type/:hazard_level
///
/// Overwrites the general recommendation and renumbers the submitted
/// associations 1..N in submission order, then redirects back. The path must
/// name an existing category before anything is written.
pub async fn submit_hazard_category_form(
    State(state): State<AppState>,
    Path((hazard_type, hazard_level)): Path<(String, String)>,
    Form(form): Form<HazardCategoryForm>,
) -> ApiResult<Redirect> {
    let key = path_key(&hazard_type, &hazard_level)?;
    let category_id = parse_id("id", &form.id)?;
    let association_ids = form
        .associations
        .iter()
        .map(|value| parse_id("associations", value))
        .collect::<Result<Vec<_>, _>>()?;

    let mut tx = state.db.begin().await?;

    db::find_category_by_key(&mut tx, &key).await?;
    let hazard_category = db::get_category(&mut tx, category_id).await?;
    db::update_general_recommendation(
        &mut tx,
        hazard_category.id,
        form.general_recommendation.as_deref().unwrap_or_default(),
    )
    .await?;
    db::resequence_associations(&mut tx, &association_ids).await?;

    tx.commit().await?;

    info!(
        "Updated hazard category {} ({} association(s) resequenced)",
        hazard_category.name(),
        association_ids.len()
    );

    Ok(Redirect::to(&category_path(&hazard_category.key)))
}

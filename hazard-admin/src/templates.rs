//! Askama templates for the admin pages
//!
//! Views are precomputed into plain rows so the templates only read fields.

use askama::Template;
use hazard_common::db::{
    CategoryAssociation, CategoryKey, HazardCategory, HazardLevel, HazardType,
    TechnicalRecommendation,
};

use crate::db::TechnicalRecSummary;

/// One cell of the type × level grid
#[derive(Debug, Clone)]
pub struct CategoryCell {
    /// Form token / display name, e.g. `FL - HIG`
    pub token: String,
    /// Link to the category editor
    pub href: String,
    pub checked: bool,
}

#[derive(Debug, Clone)]
pub struct HazardTypeRow {
    pub mnemonic: String,
    pub title: String,
    pub cells: Vec<CategoryCell>,
}

/// Build the grid rows for every (type, level) pair
///
/// `checked` marks the keys that should render as selected.
pub fn category_grid(hazard_types: &[HazardType], checked: &[CategoryKey]) -> Vec<HazardTypeRow> {
    hazard_types
        .iter()
        .map(|hazard_type| HazardTypeRow {
            mnemonic: hazard_type.mnemonic.clone(),
            title: hazard_type.title.clone(),
            cells: HazardLevel::ALL
                .iter()
                .map(|level| {
                    let key = CategoryKey::new(hazard_type.mnemonic.clone(), *level);
                    CategoryCell {
                        href: category_path(&key),
                        checked: checked.contains(&key),
                        token: key.name(),
                    }
                })
                .collect(),
        })
        .collect()
}

/// URL of the category editor
pub fn category_path(key: &CategoryKey) -> String {
    format!("/{}/{}", key.hazard_type, key.hazard_level.mnemonic())
}

/// Level column headers
#[derive(Debug, Clone)]
pub struct LevelHeader {
    pub mnemonic: &'static str,
    pub title: &'static str,
}

pub fn level_headers() -> Vec<LevelHeader> {
    HazardLevel::ALL
        .iter()
        .map(|level| LevelHeader {
            mnemonic: level.mnemonic(),
            title: level.title(),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub hazard_levels: Vec<LevelHeader>,
    pub rows: Vec<HazardTypeRow>,
}

#[derive(Template)]
#[template(path = "hazardcategory.html")]
pub struct HazardCategoryTemplate {
    pub action: String,
    pub hazard_category: HazardCategory,
    pub name: String,
    pub associations: Vec<CategoryAssociation>,
}

/// List row for the recommendation index
#[derive(Debug, Clone)]
pub struct TechnicalRecRow {
    pub id: i64,
    pub text: String,
    /// Comma-separated category names
    pub hazardcategories: String,
}

impl From<TechnicalRecSummary> for TechnicalRecRow {
    fn from(summary: TechnicalRecSummary) -> Self {
        Self {
            id: summary.id,
            text: summary.text,
            hazardcategories: summary
                .hazard_categories
                .iter()
                .map(CategoryKey::name)
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

#[derive(Template)]
#[template(path = "technical_rec_index.html")]
pub struct TechnicalRecIndexTemplate {
    pub technical_recs: Vec<TechnicalRecRow>,
}

#[derive(Template)]
#[template(path = "technical_rec_form.html")]
pub struct TechnicalRecFormTemplate {
    pub obj: TechnicalRecommendation,
    pub action: String,
    pub hazard_levels: Vec<LevelHeader>,
    pub rows: Vec<HazardTypeRow>,
}

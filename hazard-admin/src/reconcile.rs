//! Reconciliation of a recommendation's category links with a submitted form
//!
//! The form submits the full set of checked categories as
//! `"<TYPE> - <LEVEL>"` tokens. Existing links that are no longer checked
//! are deleted, newly checked ones are appended at the end of their
//! category (`max(order) + 1`). Links present on both sides are left alone,
//! including their `order`. Matching is done on [`CategoryKey`], never on
//! rendered names.

use std::collections::HashSet;

use hazard_common::db::{CategoryKey, RecommendationAssociation, TechnicalRecommendation};
use hazard_common::Result;
use sqlx::SqliteConnection;
use tracing::debug;

use crate::db;

/// Changes needed to bring stored links in line with the submission
#[derive(Debug, Default, PartialEq, Eq)]
pub struct AssociationPlan {
    /// Association ids to delete
    pub remove: Vec<i64>,
    /// Category keys to link, in submission order, without duplicates
    pub add: Vec<CategoryKey>,
}

impl AssociationPlan {
    pub fn is_empty(&self) -> bool {
        self.remove.is_empty() && self.add.is_empty()
    }
}

/// Parse the submitted association tokens
///
/// Any malformed token rejects the whole submission.
pub fn parse_tokens<S: AsRef<str>>(tokens: &[S]) -> Result<Vec<CategoryKey>> {
    tokens.iter().map(|token| token.as_ref().parse()).collect()
}

/// Compute removals and additions
pub fn plan_associations(
    current: &[RecommendationAssociation],
    submitted: &[CategoryKey],
) -> AssociationPlan {
    let wanted: HashSet<&CategoryKey> = submitted.iter().collect();

    let remove = current
        .iter()
        .filter(|association| !wanted.contains(&association.key))
        .map(|association| association.id)
        .collect();

    let mut linked: HashSet<&CategoryKey> = current
        .iter()
        .map(|association| &association.key)
        .filter(|key| wanted.contains(key))
        .collect();

    let mut add = Vec::new();
    for key in submitted {
        // insert() is false for keys already linked or already queued
        if linked.insert(key) {
            add.push(key.clone());
        }
    }

    AssociationPlan { remove, add }
}

/// Save a recommendation and its category links inside `conn`
///
/// Steps: store the text (inserting transient recommendations), delete
/// unchecked links, then link newly checked categories at the end of each
/// category's ordering. The caller owns the transaction; nothing is
/// committed here. Returns the recommendation id.
pub async fn save_with_associations(
    conn: &mut SqliteConnection,
    rec: &mut TechnicalRecommendation,
    text: String,
    tokens: &[String],
) -> Result<i64> {
    let submitted = parse_tokens(tokens)?;

    rec.text = text;
    let rec_id = db::save_technical_rec(conn, rec).await?;

    let current = db::list_recommendation_associations(conn, rec_id).await?;
    let plan = plan_associations(&current, &submitted);

    for association_id in &plan.remove {
        db::delete_association(conn, *association_id).await?;
    }

    for key in &plan.add {
        let category = db::find_category_by_key(conn, key).await?;
        let order = db::next_association_order(conn, category.id).await?;
        db::insert_association(conn, category.id, rec_id, order).await?;
        debug!("Linked recommendation {} to {} at order {}", rec_id, key, order);
    }

    debug!(
        "Recommendation {}: removed {} link(s), added {} link(s)",
        rec_id,
        plan.remove.len(),
        plan.add.len()
    );

    Ok(rec_id)
}

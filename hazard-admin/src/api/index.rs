//! Admin landing page: grid of every hazard type × level

use axum::extract::State;

use crate::templates::{category_grid, level_headers, IndexTemplate};
use crate::{db, ApiResult, AppState};

/// GET /
pub async fn admin_index(State(state): State<AppState>) -> ApiResult<IndexTemplate> {
    let mut conn = state.db.acquire().await?;
    let hazard_types = db::list_hazard_types(&mut conn).await?;

    Ok(IndexTemplate {
        hazard_levels: level_headers(),
        rows: category_grid(&hazard_types, &[]),
    })
}

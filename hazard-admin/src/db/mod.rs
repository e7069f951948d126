//! Database access layer for hazard-admin
//!
//! Query functions take `&mut SqliteConnection` so handlers can run them
//! inside a single request transaction (`&mut *tx`).

use hazard_common::db::HazardLevel;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

pub mod hazards;
pub mod technical_recs;

pub use hazards::*;
pub use technical_recs::*;

/// Decode a level mnemonic column into [`HazardLevel`]
fn level_column(row: &SqliteRow, column: &str) -> Result<HazardLevel, sqlx::Error> {
    let mnemonic: String = row.try_get(column)?;
    HazardLevel::from_mnemonic(&mnemonic).ok_or_else(|| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: format!("unknown hazard level mnemonic {:?}", mnemonic).into(),
    })
}

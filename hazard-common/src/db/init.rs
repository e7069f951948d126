//! Database initialization
//!
//! Creates the schema on first run and seeds the hazard reference data
//! (types, levels and one category per type/level pair). Every step is
//! idempotent, so opening an existing database is safe.

use crate::db::models::HazardLevel;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Hazard types seeded on first run: (mnemonic, title, display order)
pub const DEFAULT_HAZARD_TYPES: &[(&str, &str, i64)] = &[
    ("FL", "River flood", 1),
    ("UF", "Urban flood", 2),
    ("CF", "Coastal flood", 3),
    ("EQ", "Earthquake", 4),
    ("LS", "Landslide", 5),
    ("TS", "Tsunami", 6),
    ("VA", "Volcano", 7),
    ("CY", "Cyclone", 8),
    ("DG", "Water scarcity", 9),
    ("EH", "Extreme heat", 10),
    ("WF", "Wildfire", 11),
];

/// Open (or create) the database file and make sure schema and reference
/// data are in place
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets admin page reads proceed while a form submission writes
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    prepare_database(&pool).await?;

    Ok(pool)
}

/// Create tables and seed reference data on an already-connected pool
pub async fn prepare_database(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(pool)
        .await?;

    create_hazard_types_table(pool).await?;
    create_hazard_levels_table(pool).await?;
    create_hazard_categories_table(pool).await?;
    create_technical_recommendations_table(pool).await?;
    create_associations_table(pool).await?;

    seed_reference_data(pool).await?;

    Ok(())
}

async fn create_hazard_types_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hazard_types (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            mnemonic TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            "order" INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_hazard_levels_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hazard_levels (
            id INTEGER PRIMARY KEY,
            mnemonic TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            "order" INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_hazard_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hazard_categories (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hazard_type_id INTEGER NOT NULL REFERENCES hazard_types(id) ON DELETE CASCADE,
            hazard_level_id INTEGER NOT NULL REFERENCES hazard_levels(id) ON DELETE CASCADE,
            general_recommendation TEXT NOT NULL DEFAULT '',
            UNIQUE (hazard_type_id, hazard_level_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_technical_recommendations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS technical_recommendations (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            text TEXT NOT NULL DEFAULT ''
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Join table between categories and recommendations
///
/// `order` is not UNIQUE per category: resequencing rewrites rows one at a
/// time and passes through duplicate values before the commit.
async fn create_associations_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hazardcategory_technicalrecommendation (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            hazardcategory_id INTEGER NOT NULL
                REFERENCES hazard_categories(id) ON DELETE CASCADE,
            technicalrecommendation_id INTEGER NOT NULL
                REFERENCES technical_recommendations(id) ON DELETE CASCADE,
            "order" INTEGER NOT NULL,
            UNIQUE (hazardcategory_id, technicalrecommendation_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_hc_tr_category_order
            ON hazardcategory_technicalrecommendation (hazardcategory_id, "order")
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Insert missing hazard types, levels and categories
///
/// Uses INSERT OR IGNORE so existing rows (and edited general
/// recommendations) are never overwritten.
async fn seed_reference_data(pool: &SqlitePool) -> Result<()> {
    let mut tx = pool.begin().await?;

    for &(mnemonic, title, order) in DEFAULT_HAZARD_TYPES {
        sqlx::query(r#"INSERT OR IGNORE INTO hazard_types (mnemonic, title, "order") VALUES (?, ?, ?)"#)
            .bind(mnemonic)
            .bind(title)
            .bind(order)
            .execute(&mut *tx)
            .await?;
    }

    for level in HazardLevel::ALL {
        sqlx::query(
            r#"INSERT OR IGNORE INTO hazard_levels (id, mnemonic, title, "order") VALUES (?, ?, ?, ?)"#,
        )
        .bind(level.order())
        .bind(level.mnemonic())
        .bind(level.title())
        .bind(level.order())
        .execute(&mut *tx)
        .await?;
    }

    let created = sqlx::query(
        r#"
        INSERT OR IGNORE INTO hazard_categories (hazard_type_id, hazard_level_id)
        SELECT t.id, l.id
        FROM hazard_types t
        CROSS JOIN hazard_levels l
        "#,
    )
    .execute(&mut *tx)
    .await?
    .rows_affected();

    tx.commit().await?;

    if created > 0 {
        info!("Seeded {} hazard categories", created);
    }

    Ok(())
}

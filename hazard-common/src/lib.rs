//! # Hazard Common Library
//!
//! Shared code for the hazard admin services including:
//! - Database initialization and reference data seeding
//! - Hazard data model (types, levels, categories, recommendations)
//! - Bootstrap configuration loading
//! - Common error type

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};

//! Database models
//!
//! Hazard types and levels are reference data. A hazard category pairs one
//! type with one level and is addressed in URLs and forms by its
//! [`CategoryKey`], rendered as `"<TYPE> - <LEVEL>"`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between the type and level mnemonics in a category name
pub const CATEGORY_SEPARATOR: &str = " - ";

/// Severity tier of a hazard, a fixed enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HazardLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl HazardLevel {
    /// All levels in display order
    pub const ALL: [HazardLevel; 4] = [
        HazardLevel::High,
        HazardLevel::Medium,
        HazardLevel::Low,
        HazardLevel::VeryLow,
    ];

    pub fn mnemonic(&self) -> &'static str {
        match self {
            HazardLevel::High => "HIG",
            HazardLevel::Medium => "MED",
            HazardLevel::Low => "LOW",
            HazardLevel::VeryLow => "VLO",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            HazardLevel::High => "High",
            HazardLevel::Medium => "Medium",
            HazardLevel::Low => "Low",
            HazardLevel::VeryLow => "Very low",
        }
    }

    /// Position in [`HazardLevel::ALL`], 1-based (also the seeded row id)
    pub fn order(&self) -> i64 {
        match self {
            HazardLevel::High => 1,
            HazardLevel::Medium => 2,
            HazardLevel::Low => 3,
            HazardLevel::VeryLow => 4,
        }
    }

    pub fn from_mnemonic(mnemonic: &str) -> Option<Self> {
        HazardLevel::ALL
            .into_iter()
            .find(|level| level.mnemonic() == mnemonic)
    }
}

impl fmt::Display for HazardLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl FromStr for HazardLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        HazardLevel::from_mnemonic(s)
            .ok_or_else(|| Error::InvalidInput(format!("Unknown hazard level: {}", s)))
    }
}

/// A kind of natural hazard (flood, earthquake, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HazardType {
    pub id: i64,
    pub mnemonic: String,
    pub title: String,
    pub order: i64,
}

/// Structural identity of a hazard category: (type mnemonic, level)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryKey {
    pub hazard_type: String,
    pub hazard_level: HazardLevel,
}

impl CategoryKey {
    pub fn new(hazard_type: impl Into<String>, hazard_level: HazardLevel) -> Self {
        Self {
            hazard_type: hazard_type.into(),
            hazard_level,
        }
    }

    /// Human-readable name, e.g. `FL - HIG`
    pub fn name(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.hazard_type, CATEGORY_SEPARATOR, self.hazard_level
        )
    }
}

impl FromStr for CategoryKey {
    type Err = Error;

    /// Parse a form token of the shape `"<TYPE> - <LEVEL>"`
    fn from_str(token: &str) -> Result<Self> {
        let (hazard_type, hazard_level) = token
            .split_once(CATEGORY_SEPARATOR)
            .ok_or_else(|| Error::InvalidInput(format!("Malformed association: {:?}", token)))?;

        if hazard_type.is_empty() || hazard_type.contains(char::is_whitespace) {
            return Err(Error::InvalidInput(format!(
                "Malformed hazard type in association: {:?}",
                token
            )));
        }

        Ok(CategoryKey::new(hazard_type, hazard_level.parse()?))
    }
}

/// A (type, level) pair with its general recommendation text
#[derive(Debug, Clone, Serialize)]
pub struct HazardCategory {
    pub id: i64,
    pub key: CategoryKey,
    pub hazard_type_title: String,
    pub general_recommendation: String,
}

impl HazardCategory {
    pub fn name(&self) -> String {
        self.key.name()
    }
}

/// Free-text technical guidance linkable to many hazard categories
///
/// `id` is `None` while the recommendation is transient (built by the
/// "new" form and not yet inserted).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TechnicalRecommendation {
    pub id: Option<i64>,
    pub text: String,
}

impl TechnicalRecommendation {
    /// A recommendation that has not been persisted yet
    pub fn transient() -> Self {
        Self::default()
    }

    pub fn is_transient(&self) -> bool {
        self.id.is_none()
    }
}

/// Association row as seen from a hazard category (ordered list entry)
#[derive(Debug, Clone, Serialize)]
pub struct CategoryAssociation {
    pub id: i64,
    pub order: i64,
    pub technicalrecommendation_id: i64,
    pub text: String,
}

/// Association row as seen from a technical recommendation
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationAssociation {
    pub id: i64,
    pub hazardcategory_id: i64,
    pub key: CategoryKey,
    pub order: i64,
}

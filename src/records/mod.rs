/// Canonical nutrition records and the types that travel with them.
///
/// Everything past the normalizer works with [`NutritionRecord`]; the raw,
/// loosely-shaped upstream payloads live in [`raw`] and never leave
/// [`normalize`].
pub mod normalize;
pub mod raw;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Defaults ─────────────────────────────────────────────────────────

pub const UNKNOWN_PRODUCT: &str = "Unknown Product";
pub const UNKNOWN_BRAND: &str = "Unknown Brand";
pub const DEFAULT_SERVING_SIZE: &str = "100 g";

// ── NutriScore ───────────────────────────────────────────────────────

/// Nutri-Score grade as reported by the food database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NutriScore {
    A,
    B,
    C,
    D,
    E,
    #[default]
    Unknown,
}

impl NutriScore {
    /// Parse a grade letter. Anything outside `a`..`e` is `Unknown`.
    #[must_use]
    pub fn from_grade(grade: &str) -> Self {
        match grade.trim().to_ascii_lowercase().as_str() {
            "a" => Self::A,
            "b" => Self::B,
            "c" => Self::C,
            "d" => Self::D,
            "e" => Self::E,
            _ => Self::Unknown,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::B => "b",
            Self::C => "c",
            Self::D => "d",
            Self::E => "e",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for NutriScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Records ──────────────────────────────────────────────────────────

/// Enrichment carried by records that came from the external food database.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductDetails {
    /// Used only to correlate with the lookup; not an identity within a document.
    pub barcode: String,
    pub brand: String,
    pub fiber: f64,
    pub sugars: f64,
    pub serving_size: String,
    pub image_url: String,
    pub nutri_score: NutriScore,
    /// NOVA processing group, `0` when unknown.
    pub nova_group: u8,
}

impl Default for ProductDetails {
    fn default() -> Self {
        Self {
            barcode: String::new(),
            brand: UNKNOWN_BRAND.to_string(),
            fiber: 0.0,
            sugars: 0.0,
            serving_size: DEFAULT_SERVING_SIZE.to_string(),
            image_url: String::new(),
            nutri_score: NutriScore::Unknown,
            nova_group: 0,
        }
    }
}

/// One normalized, source-agnostic food entry.
///
/// Immutable once built: fields are private and only readable through
/// accessors. Macro values are clamped to finite, non-negative numbers on
/// construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NutritionRecord {
    date: NaiveDate,
    name: String,
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    product: Option<ProductDetails>,
}

impl NutritionRecord {
    pub fn new(
        date: NaiveDate,
        name: impl Into<String>,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Self {
        Self {
            date,
            name: name.into(),
            calories: non_negative(calories),
            protein: non_negative(protein),
            carbs: non_negative(carbs),
            fat: non_negative(fat),
            product: None,
        }
    }

    /// Attach food-database enrichment.
    #[must_use]
    pub fn with_product(self, mut product: ProductDetails) -> Self {
        product.fiber = non_negative(product.fiber);
        product.sugars = non_negative(product.sugars);
        Self {
            product: Some(product),
            ..self
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn calories(&self) -> f64 {
        self.calories
    }

    #[must_use]
    pub fn protein(&self) -> f64 {
        self.protein
    }

    #[must_use]
    pub fn carbs(&self) -> f64 {
        self.carbs
    }

    #[must_use]
    pub fn fat(&self) -> f64 {
        self.fat
    }

    #[must_use]
    pub fn product(&self) -> Option<&ProductDetails> {
        self.product.as_ref()
    }
}

/// Clamp to a finite, non-negative value (`0` otherwise).
pub(crate) fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

// ── Profile & search ─────────────────────────────────────────────────

/// The person the analysis is written for.
///
/// Only `name`, `daily_calorie_target` and `goal` reach the prompt template;
/// the physical attributes are carried as context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub daily_calorie_target: u32,
    pub goal: String,
    #[serde(default)]
    pub weight_lbs: f64,
    #[serde(default)]
    pub height_in: f64,
    #[serde(default)]
    pub activity_level: String,
}

impl UserProfile {
    /// Reject profiles the prompt cannot be built around.
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.daily_calorie_target > 0,
            "daily_calorie_target must be positive"
        );
        anyhow::ensure!(!self.name.trim().is_empty(), "profile name must not be empty");
        Ok(())
    }
}

/// A page of normalized food-database search results.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResult {
    pub total_count: u64,
    pub page: u64,
    pub page_size: u64,
    pub records: Vec<NutritionRecord>,
}

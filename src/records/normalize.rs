/// Total mapping from raw upstream records to [`NutritionRecord`].
///
/// None of these functions fail: missing or malformed values fall back to the
/// documented defaults so that one dirty row never blocks prompt
/// construction. The clock is never read here; callers pass `today` for
/// food-database products.
use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde_json::Value;

use super::raw::{FoodLogRow, RawProduct, RawSearchPage};
use super::{
    DEFAULT_SERVING_SIZE, NutriScore, NutritionRecord, ProductDetails, SearchResult,
    UNKNOWN_BRAND, UNKNOWN_PRODUCT, non_negative,
};

// ── Public API ───────────────────────────────────────────────────────

/// Normalize a food-log row, dating it by the local calendar day.
#[must_use]
pub fn normalize_log_row(row: &FoodLogRow) -> NutritionRecord {
    normalize_log_row_in(row, &Local)
}

/// Normalize a food-log row, dating it by the calendar day in `tz`.
#[must_use]
pub fn normalize_log_row_in<Tz: TimeZone>(row: &FoodLogRow, tz: &Tz) -> NutritionRecord {
    let timestamp = coerce_i64(row.timestamp.as_ref());
    let date = DateTime::from_timestamp(timestamp, 0)
        .map(|utc| utc.with_timezone(tz).date_naive())
        .unwrap_or_default();

    NutritionRecord::new(
        date,
        text_or(row.food_name.as_ref(), UNKNOWN_PRODUCT),
        coerce_f64(row.calories.as_ref()),
        coerce_f64(row.protein.as_ref()),
        coerce_f64(row.carbs.as_ref()),
        coerce_f64(row.fat.as_ref()),
    )
}

/// Normalize a food-database product, stamping it with `today`.
#[must_use]
pub fn normalize_product(raw: &RawProduct, today: NaiveDate) -> NutritionRecord {
    let n = raw.nutriments.as_ref();

    let details = ProductDetails {
        barcode: barcode(raw.code.as_ref()),
        brand: text_or(raw.brands.as_ref(), UNKNOWN_BRAND),
        fiber: nutrient(n, "fiber"),
        sugars: nutrient(n, "sugars"),
        serving_size: text_or(raw.serving_size.as_ref(), DEFAULT_SERVING_SIZE),
        image_url: text_or(raw.image_url.as_ref(), ""),
        nutri_score: raw
            .nutriscore_grade
            .as_ref()
            .and_then(Value::as_str)
            .map_or(NutriScore::Unknown, NutriScore::from_grade),
        nova_group: nova_group(raw.nova_group.as_ref()),
    };

    NutritionRecord::new(
        today,
        text_or(raw.product_name.as_ref(), UNKNOWN_PRODUCT),
        nutrient(n, "energy-kcal"),
        nutrient(n, "proteins"),
        nutrient(n, "carbohydrates"),
        nutrient(n, "fat"),
    )
    .with_product(details)
}

/// Normalize a whole search page; product order is preserved.
#[must_use]
pub fn normalize_search_page(page: &RawSearchPage, today: NaiveDate) -> SearchResult {
    SearchResult {
        total_count: coerce_u64(page.count.as_ref()),
        page: coerce_u64(page.page.as_ref()),
        page_size: coerce_u64(page.page_size.as_ref()),
        records: page
            .products
            .iter()
            .map(|p| normalize_product(p, today))
            .collect(),
    }
}

// ── Coercion helpers ─────────────────────────────────────────────────

/// Numbers and numeric strings become `f64`; everything else, and any
/// negative or non-finite result, becomes `0`.
#[must_use]
pub fn coerce_f64(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    non_negative(raw)
}

fn coerce_i64(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| {
                    s.parse::<f64>()
                        .ok()
                        .filter(|f| f.is_finite())
                        .map(|f| f as i64)
                })
                .unwrap_or(0)
        }
        _ => 0,
    }
}

fn coerce_u64(value: Option<&Value>) -> u64 {
    coerce_i64(value).max(0) as u64
}

/// Non-empty strings pass through; anything else yields `default`.
fn text_or(value: Option<&Value>, default: &str) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => default.to_string(),
    }
}

fn barcode(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.as_u64().map_or_else(|| n.to_string(), |v| v.to_string()),
        _ => String::new(),
    }
}

/// NOVA groups 1–4 are kept, everything else is `0` (unknown).
fn nova_group(value: Option<&Value>) -> u8 {
    match coerce_i64(value) {
        g @ 1..=4 => g as u8,
        _ => 0,
    }
}

/// Look up `key_100g`, falling back to the bare `key`.
fn nutrient(nutriments: Option<&HashMap<String, Value>>, key: &str) -> f64 {
    let Some(n) = nutriments else {
        return 0.0;
    };
    let value = n
        .get(&format!("{key}_100g"))
        .filter(|v| !v.is_null())
        .or_else(|| n.get(key));
    coerce_f64(value)
}

// ── Tests ────────────────────────────────────────────────────────────

/// Raw records as they arrive from the local food log and the food database.
///
/// Every field is optional and untyped so that deserializing a dirty payload
/// never fails; interpretation happens in [`super::normalize`].
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A row of the local food log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FoodLogRow {
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub timestamp: Option<Value>,
    #[serde(default)]
    pub food_name: Option<Value>,
    #[serde(default)]
    pub calories: Option<Value>,
    #[serde(default)]
    pub protein: Option<Value>,
    #[serde(default)]
    pub carbs: Option<Value>,
    #[serde(default)]
    pub fat: Option<Value>,
}

impl FoodLogRow {
    /// Convenience constructor for well-formed rows.
    pub fn new(
        timestamp: i64,
        food_name: &str,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> Self {
        Self {
            timestamp: Some(Value::from(timestamp)),
            food_name: Some(Value::from(food_name)),
            calories: Some(Value::from(calories)),
            protein: Some(Value::from(protein)),
            carbs: Some(Value::from(carbs)),
            fat: Some(Value::from(fat)),
        }
    }
}

/// A product object as returned by the food database.
///
/// Built through [`RawProduct::from_value`], which accepts any JSON shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawProduct {
    pub code: Option<Value>,
    pub product_name: Option<Value>,
    pub brands: Option<Value>,
    /// Nutrient values keyed by name, with optional `_100g` variants.
    pub nutriments: Option<HashMap<String, Value>>,
    pub serving_size: Option<Value>,
    pub image_url: Option<Value>,
    pub nutriscore_grade: Option<Value>,
    pub nova_group: Option<Value>,
}

impl RawProduct {
    /// Interpret an arbitrary JSON value as a product.
    ///
    /// Non-object values, or objects whose `nutriments` is not a map, fall
    /// back field by field rather than failing.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let nutriments = match map.remove("nutriments") {
            Some(Value::Object(n)) => Some(n.into_iter().collect()),
            _ => None,
        };
        Self {
            code: map.remove("code"),
            product_name: map.remove("product_name"),
            brands: map.remove("brands"),
            nutriments,
            serving_size: map.remove("serving_size"),
            image_url: map.remove("image_url"),
            nutriscore_grade: map.remove("nutriscore_grade"),
            nova_group: map.remove("nova_group"),
        }
    }
}

/// A search response page from the food database.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSearchPage {
    pub count: Option<Value>,
    pub page: Option<Value>,
    pub page_size: Option<Value>,
    pub products: Vec<RawProduct>,
}

impl RawSearchPage {
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(mut map) = value else {
            return Self::default();
        };
        let products = match map.remove("products") {
            Some(Value::Array(items)) => items.into_iter().map(RawProduct::from_value).collect(),
            _ => Vec::new(),
        };
        Self {
            count: map.remove("count"),
            page: map.remove("page"),
            page_size: map.remove("page_size"),
            products,
        }
    }
}

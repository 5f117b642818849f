/// Built-in demonstration data: five days of food log and the profile it
/// belongs to. Used by the binary when no `--log`/`--profile` is given.
use crate::records::normalize::normalize_log_row;
use crate::records::raw::FoodLogRow;
use crate::records::{NutritionRecord, UserProfile};

/// Noon UTC on 2025-02-10..14, so the calendar day is the same in every
/// timezone from UTC-12 to UTC+11.
const DAYS: [i64; 5] = [
    1_739_188_800,
    1_739_275_200,
    1_739_361_600,
    1_739_448_000,
    1_739_534_400,
];

/// `(day index, food, kcal, protein, carbs, fat)`
const ENTRIES: [(usize, &str, f64, f64, f64, f64); 15] = [
    (0, "Oatmeal with Berries", 350.0, 12.0, 58.0, 8.0),
    (0, "Grilled Chicken Salad", 420.0, 45.0, 12.0, 18.0),
    (0, "Salmon with Rice", 550.0, 38.0, 55.0, 16.0),
    (1, "Pancakes with Syrup", 600.0, 10.0, 95.0, 20.0),
    (1, "Double Cheeseburger", 850.0, 45.0, 50.0, 52.0),
    (1, "Large Pizza Slice x3", 900.0, 36.0, 96.0, 36.0),
    (2, "Coffee only", 5.0, 0.0, 0.0, 0.0),
    (2, "Large Burrito", 980.0, 42.0, 90.0, 38.0),
    (3, "Greek Yogurt Parfait", 280.0, 18.0, 35.0, 8.0),
    (3, "Turkey Sandwich", 380.0, 28.0, 40.0, 12.0),
    (3, "Stir Fry Vegetables", 320.0, 15.0, 30.0, 14.0),
    (4, "Granola Bar", 190.0, 4.0, 30.0, 7.0),
    (4, "Chips and Salsa", 420.0, 5.0, 55.0, 22.0),
    (4, "Pad Thai", 650.0, 25.0, 80.0, 22.0),
    (4, "Ice Cream", 350.0, 5.0, 40.0, 18.0),
];

/// The demo user.
#[must_use]
pub fn demo_profile() -> UserProfile {
    UserProfile {
        name: "Vineet".into(),
        daily_calorie_target: 2200,
        goal: "Lose weight".into(),
        weight_lbs: 180.0,
        height_in: 70.0,
        activity_level: "Moderate".into(),
    }
}

/// The fifteen raw log rows, in logging order.
#[must_use]
pub fn sample_log() -> Vec<FoodLogRow> {
    ENTRIES
        .iter()
        .map(|&(day, name, cal, pro, carb, fat)| FoodLogRow::new(DAYS[day], name, cal, pro, carb, fat))
        .collect()
}

/// The sample log normalized against the local timezone.
#[must_use]
pub fn sample_records() -> Vec<NutritionRecord> {
    sample_log().iter().map(normalize_log_row).collect()
}

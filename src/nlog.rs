/// NLOG encoder: the compact, pipe-delimited text form of a food log.
///
/// ```text
/// NLOG/1.0
/// H|date|food|cal|pro|carb|fat
/// ---
/// 250210|Oatmeal with Berries|350|12.0|58.0|8.0
/// ```
///
/// Output is deterministic: records are stable-sorted by date, names are
/// sanitized before truncation, and numbers use fixed rounding rules.
use chrono::NaiveDate;

use crate::records::NutritionRecord;

pub const NLOG_VERSION_LINE: &str = "NLOG/1.0";
pub const NLOG_COLUMN_HEADER: &str = "H|date|food|cal|pro|carb|fat";
pub const NLOG_SEPARATOR: &str = "---";

/// Field delimiter within a data line.
pub const DELIMITER: char = '|';

/// Upper bound on the encoded food name, in characters.
pub const MAX_FOOD_NAME_CHARS: usize = 30;

/// Encode records into an NLOG document.
///
/// Lines are joined with `\n` without a trailing newline; an empty slice
/// yields just the three header lines.
#[must_use]
pub fn encode(records: &[NutritionRecord]) -> String {
    let mut ordered: Vec<&NutritionRecord> = records.iter().collect();
    // `sort_by_key` is stable: same-day records keep their input order.
    ordered.sort_by_key(|r| r.date());

    let mut lines = Vec::with_capacity(ordered.len() + 3);
    lines.push(NLOG_VERSION_LINE.to_string());
    lines.push(NLOG_COLUMN_HEADER.to_string());
    lines.push(NLOG_SEPARATOR.to_string());
    lines.extend(ordered.into_iter().map(encode_line));
    lines.join("\n")
}

/// Encode a single record as one data line (no newline).
#[must_use]
pub fn encode_line(record: &NutritionRecord) -> String {
    format!(
        "{date}|{food}|{cal}|{pro}|{carb}|{fat}",
        date = format_date(record.date()),
        food = sanitize_name(record.name()),
        cal = format_calories(record.calories()),
        pro = format_grams(record.protein()),
        carb = format_grams(record.carbs()),
        fat = format_grams(record.fat()),
    )
}

/// `YYMMDD`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Replace every `|` with `-`, then cut to [`MAX_FOOD_NAME_CHARS`].
#[must_use]
pub fn sanitize_name(name: &str) -> String {
    name.replace(DELIMITER, "-")
        .chars()
        .take(MAX_FOOD_NAME_CHARS)
        .collect()
}

/// Nearest whole kilocalorie, half rounded up.
#[must_use]
pub fn format_calories(kcal: f64) -> String {
    format!("{}", kcal.round() as i64)
}

/// One decimal digit, half rounded up (`12.05` → `12.1`).
#[must_use]
pub fn format_grams(grams: f64) -> String {
    let rounded = (grams * 10.0).round() / 10.0;
    format!("{rounded:.1}")
}

/// Prompt assembly and size accounting.
///
/// The system prompt is plain template interpolation. It has no branches on
/// the data, so one profile plus one NLOG document always gives the same bytes.
use serde::Serialize;

use crate::records::UserProfile;

/// Character count and a coarse token estimate (`ceil(chars / 4)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextMetrics {
    pub chars: usize,
    pub approx_tokens: usize,
}

impl TextMetrics {
    #[must_use]
    pub fn of(text: &str) -> Self {
        let chars = text.chars().count();
        Self {
            chars,
            approx_tokens: chars.div_ceil(4),
        }
    }
}

/// The two instructions sent to the generation backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptBundle {
    pub system: String,
    /// Passed through from the caller untouched.
    pub user: String,
}

impl PromptBundle {
    #[must_use]
    pub fn assemble(profile: &UserProfile, nlog: &str, user_instruction: &str) -> Self {
        Self {
            system: build_system_prompt(profile, nlog),
            user: user_instruction.to_string(),
        }
    }
}

/// Build the system instruction around an NLOG document.
#[must_use]
pub fn build_system_prompt(profile: &UserProfile, nlog: &str) -> String {
    let name = &profile.name;
    let target = profile.daily_calorie_target;
    let goal = &profile.goal;

    format!(
        "You are a food diary analysis assistant. You help users understand their eating \
patterns by analyzing their food log data. This is NOT medical advice; it is simply pattern \
analysis of the numbers below.

USER INFO:
- Name: {name}
- Daily Calorie Target: {target} kcal
- Fitness Goal: {goal}

FOOD LOG DATA (format: date|food|calories|protein_g|carbs_g|fat_g):
{nlog}

YOUR TASK:
1. Calculate the daily calorie totals for each day in the log.
2. Compare each day's total against the {target} kcal target.
3. Identify which specific foods contributed the most calories.
4. Suggest one small, practical swap the user could make.
Keep your response to 2-3 short paragraphs. Reference specific foods and dates."
    )
}

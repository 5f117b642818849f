/// Terminal presentation for pipeline runs.
///
/// Stage progress goes to stderr as it happens; the final report is a plain
/// string the binary prints to stdout.
use std::fmt::Write as _;

use crate::nlog::{format_calories, format_grams};
use crate::pipeline::{GenerationOutcome, PipelineReport, Stage, StageEvent, StageObserver, StageStatus};
use crate::records::NutritionRecord;

const RULE: &str = "─────────────────────────────────────────────────────";
const BANNER: &str = "═══════════════════════════════════════════════════════";

/// Prints one progress line per stage event to stderr.
pub struct ConsoleObserver;

impl StageObserver for ConsoleObserver {
    fn on_event(&self, event: &StageEvent) {
        if let Some(line) = progress_line(event) {
            eprintln!("{line}");
        }
    }
}

fn progress_line(event: &StageEvent) -> Option<String> {
    let size = event
        .metrics
        .map(|m| format!(" ({} chars, ~{} tokens)", m.chars, m.approx_tokens))
        .unwrap_or_default();

    match (event.stage, &event.status) {
        (Stage::Encode, StageStatus::Succeeded) => Some(format!("  [1/3] Encoded food log to NLOG{size}")),
        (Stage::Assemble, StageStatus::Succeeded) => Some(format!("  [2/3] Assembled system prompt{size}")),
        (Stage::Generate, StageStatus::Started) => Some("  [3/3] Generating response...".to_string()),
        (Stage::Generate, StageStatus::Succeeded) => Some(format!("  [3/3] Response received{size}")),
        (stage, StageStatus::Failed(diagnostic)) => Some(format!("  [{stage}] failed: {diagnostic}")),
        _ => None,
    }
}

/// Render the final report for stdout.
pub fn render_report(report: &PipelineReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out, "  NutriLog analysis ({} entries)", report.record_count);
    let _ = writeln!(out, "{BANNER}");
    let _ = writeln!(out);
    let _ = writeln!(out, "NLOG document:");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "{}", report.nlog);
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{} entries -> {} chars (~{} tokens); system prompt {} chars (~{} tokens)",
        report.record_count,
        report.nlog_metrics.chars,
        report.nlog_metrics.approx_tokens,
        report.prompt_metrics.chars,
        report.prompt_metrics.approx_tokens
    );
    let _ = writeln!(out);
    if !report.products.is_empty() {
        let _ = writeln!(out, "Food database products:");
        for record in &report.products {
            out.push_str(&render_product(record));
        }
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "Model: {}", report.model_id);
    let _ = writeln!(out, "Question: \"{}\"", report.prompt.user);
    let _ = writeln!(out);

    match &report.outcome {
        GenerationOutcome::Generated { text, usage } => {
            let _ = writeln!(out, "━━━ Response ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            let _ = writeln!(out);
            let _ = writeln!(out, "{text}");
            let _ = writeln!(out);
            let _ = writeln!(out, "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
            let _ = writeln!(
                out,
                "Token usage: {} prompt + {} completion = {} total",
                counter(usage.input_tokens),
                counter(usage.output_tokens),
                usage.total()
            );
        }
        GenerationOutcome::Failed { diagnostic } => {
            let _ = writeln!(out, "Generation failed: {diagnostic}");
            let _ = writeln!(
                out,
                "Check that the backend is running and the model is available, or rerun with --mock."
            );
        }
    }
    out
}

/// Box-drawn card for a record with food-database details; empty otherwise.
pub fn render_product(record: &NutritionRecord) -> String {
    let Some(p) = record.product() else {
        return String::new();
    };
    let nova = if p.nova_group == 0 {
        "?".to_string()
    } else {
        p.nova_group.to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "  ┌{RULE}");
    let _ = writeln!(out, "  │ {} ({})", record.name(), p.brand);
    let _ = writeln!(out, "  │ Barcode:  {}", p.barcode);
    let _ = writeln!(out, "  │ Calories: {} kcal / 100g", format_calories(record.calories()));
    let _ = writeln!(out, "  │ Protein:  {} g / 100g", format_grams(record.protein()));
    let _ = writeln!(out, "  │ Carbs:    {} g / 100g", format_grams(record.carbs()));
    let _ = writeln!(out, "  │ Fat:      {} g / 100g", format_grams(record.fat()));
    let _ = writeln!(out, "  │ Fiber:    {} g / 100g", format_grams(p.fiber));
    let _ = writeln!(out, "  │ Sugars:   {} g / 100g", format_grams(p.sugars));
    let _ = writeln!(out, "  │ Serving:  {}", p.serving_size);
    let _ = writeln!(
        out,
        "  │ Nutri-Score: {} | NOVA: {nova}",
        p.nutri_score.as_str().to_ascii_uppercase()
    );
    let _ = writeln!(out, "  └{RULE}");
    out
}

fn counter(value: Option<u32>) -> String {
    value.map_or_else(|| "?".to_string(), |v| v.to_string())
}

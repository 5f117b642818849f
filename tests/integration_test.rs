/// End-to-end integration tests for the NutriLog pipeline.
///
/// Tests the complete flow:
///   Raw log rows / products → Normalizer → NLOG → Prompt → Backend → Report
use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use httpmock::prelude::*;
use serde_json::json;

use nutrilog::config::{Config, GenerationConfig};
use nutrilog::generation::mock::MockBackend;
use nutrilog::generation::openai::OpenAiCompatibleBackend;
use nutrilog::generation::{GenerationError, TokenUsage};
use nutrilog::nlog;
use nutrilog::pipeline::{DEFAULT_INSTRUCTION, GenerationOutcome, NoopObserver, Pipeline};
use nutrilog::records::NutritionRecord;
use nutrilog::records::normalize::{normalize_log_row_in, normalize_product};
use nutrilog::records::raw::{FoodLogRow, RawProduct};
use nutrilog::sample::{demo_profile, sample_log};

fn utc_records() -> Vec<NutritionRecord> {
    sample_log()
        .iter()
        .map(|row| normalize_log_row_in(row, &Utc))
        .collect()
}

/// Full pipeline against the demo data and a mock backend.
#[tokio::test]
async fn test_full_pipeline_with_mock_backend() {
    // 1. Normalize the sample log
    let records = utc_records();
    assert_eq!(records.len(), 15);

    let mut per_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for r in &records {
        *per_day.entry(r.date()).or_default() += r.calories();
    }
    assert_eq!(
        per_day.values().copied().collect::<Vec<_>>(),
        vec![1320.0, 2350.0, 985.0, 980.0, 1610.0],
        "Per-day calorie totals"
    );

    // 2. Run the pipeline
    let backend = Arc::new(MockBackend::replying(
        "Day two was 150 kcal over target.",
        TokenUsage::new(Some(812), Some(143)),
    ));
    let pipeline = Pipeline::new(Arc::new(Config::default()), backend.clone());
    let report = pipeline
        .run(&records, &demo_profile(), DEFAULT_INSTRUCTION, &NoopObserver)
        .await;

    // 3. NLOG document
    let lines: Vec<&str> = report.nlog.lines().collect();
    assert_eq!(lines.len(), 18, "3 header lines + 15 records");
    assert_eq!(lines[0], "NLOG/1.0");
    assert_eq!(lines[1], "H|date|food|cal|pro|carb|fat");
    assert_eq!(lines[2], "---");
    assert_eq!(lines[3], "250210|Oatmeal with Berries|350|12.0|58.0|8.0");
    assert_eq!(lines[17], "250214|Ice Cream|350|5.0|40.0|18.0");

    // 4. Prompt
    let system = &report.prompt.system;
    assert!(system.contains("Vineet"));
    assert!(system.contains("2200 kcal"));
    assert!(system.contains("Lose weight"));
    assert!(system.contains(&report.nlog), "Full NLOG document embedded");
    assert_eq!(report.prompt.user, DEFAULT_INSTRUCTION);

    // 5. Outcome
    match &report.outcome {
        GenerationOutcome::Generated { text, usage } => {
            assert_eq!(text, "Day two was 150 kcal over target.");
            assert_eq!(usage.total(), 955);
        }
        other => panic!("expected generated outcome, got {other:?}"),
    }
    assert_eq!(backend.calls().len(), 1);
}

#[tokio::test]
async fn test_generation_failure_is_reported() {
    let backend = Arc::new(MockBackend::failing(GenerationError::Status {
        status: 500,
        message: "model crashed".into(),
    }));
    let pipeline = Pipeline::new(Arc::new(Config::default()), backend);
    let report = pipeline
        .run(&utc_records(), &demo_profile(), DEFAULT_INSTRUCTION, &NoopObserver)
        .await;

    match &report.outcome {
        GenerationOutcome::Failed { diagnostic } => {
            assert!(diagnostic.contains("500"));
            assert!(diagnostic.contains("model crashed"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(report.nlog.lines().count(), 18);
    assert!(report.prompt.system.contains(&report.nlog));
}

/// Dirty rows and a sparse product still make it through to the prompt.
#[tokio::test]
async fn test_mixed_sources_and_dirty_input() {
    let today = NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
    let dirty: FoodLogRow = serde_json::from_value(json!({
        "timestamp": 1_739_188_800,
        "food_name": "Soup | Bread",
        "calories": "abc",
        "protein": -4,
    }))
    .unwrap();
    let product = RawProduct::from_value(json!({
        "code": "3017620422003",
        "product_name": "Nutella",
        "nutriments": {"energy-kcal_100g": 539, "proteins_100g": 6.3, "fat": "30.9"},
    }));

    let records = vec![
        normalize_product(&product, today),
        normalize_log_row_in(&dirty, &Utc),
    ];
    let pipeline = Pipeline::new(Arc::new(Config::default()), Arc::new(MockBackend::default()));
    let report = pipeline
        .run(&records, &demo_profile(), "What should I change?", &NoopObserver)
        .await;

    assert_eq!(
        report.nlog,
        format!(
            "{}\n{}\n{}\n250210|Soup - Bread|0|0.0|0.0|0.0\n250220|Nutella|539|6.3|0.0|30.9",
            nlog::NLOG_VERSION_LINE,
            nlog::NLOG_COLUMN_HEADER,
            nlog::NLOG_SEPARATOR
        )
    );
}

/// Same pipeline over a real HTTP round trip to an OpenAI-compatible server.
#[tokio::test]
async fn test_pipeline_over_http_backend() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/chat/completions")
                .body_contains("2200 kcal")
                .body_contains("250211|Double Cheeseburger|850|45.0|50.0|52.0");
            then.status(200).json_body(json!({
                "choices": [{"message": {"role": "assistant", "content": "Skip the third pizza slice."}}],
                "usage": {"prompt_tokens": 900},
            }));
        })
        .await;

    let config = Config {
        generation: GenerationConfig {
            base_url: format!("{}/v1", server.base_url()),
            ..Default::default()
        },
        ..Default::default()
    };
    let backend = Arc::new(OpenAiCompatibleBackend::new(&config.generation).unwrap());
    let pipeline = Pipeline::new(Arc::new(config), backend);
    let report = pipeline
        .run(&utc_records(), &demo_profile(), DEFAULT_INSTRUCTION, &NoopObserver)
        .await;

    mock.assert_async().await;
    assert_eq!(report.model_id, "llama3.2:1b");
    assert_eq!(
        report.outcome,
        GenerationOutcome::Generated {
            text: "Skip the third pizza slice.".into(),
            usage: TokenUsage::new(Some(900), None),
        }
    );
}

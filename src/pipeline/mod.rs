/// Pipeline orchestration: canonical records → NLOG → prompt → generation.
///
/// Encoding and assembly are pure; the generation call is the only effect.
/// A generation failure becomes part of the report instead of an error.
pub mod events;

use std::sync::Arc;

use tracing::info;

pub use events::{NoopObserver, Stage, StageEvent, StageObserver, StageStatus, TracingObserver};

use crate::config::Config;
use crate::generation::{GenerationBackend, TokenUsage};
use crate::nlog;
use crate::prompt::{PromptBundle, TextMetrics};
use crate::records::{NutritionRecord, UserProfile};

/// User instruction used when the caller does not supply one.
pub const DEFAULT_INSTRUCTION: &str =
    "Why am I not losing weight? Give me specific feedback based on my food log.";

/// What happened at the generation stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Generated { text: String, usage: TokenUsage },
    Failed { diagnostic: String },
}

impl GenerationOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated { .. })
    }
}

/// Everything a run produced. The NLOG document and the prompt are always
/// present, even when generation failed.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub record_count: usize,
    pub nlog: String,
    pub nlog_metrics: TextMetrics,
    pub prompt: PromptBundle,
    pub prompt_metrics: TextMetrics,
    pub model_id: String,
    pub outcome: GenerationOutcome,
    /// Input records that carry food-database details, in input order.
    pub products: Vec<NutritionRecord>,
}

pub struct Pipeline {
    config: Arc<Config>,
    backend: Arc<dyn GenerationBackend>,
}

impl Pipeline {
    pub fn new(config: Arc<Config>, backend: Arc<dyn GenerationBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run all stages once. Never fails; see [`GenerationOutcome`].
    pub async fn run(
        &self,
        records: &[NutritionRecord],
        profile: &UserProfile,
        user_instruction: &str,
        observer: &dyn StageObserver,
    ) -> PipelineReport {
        // 1. Encode
        let nlog = nlog::encode(records);
        let nlog_metrics = TextMetrics::of(&nlog);
        observer.on_event(&StageEvent::succeeded(Stage::Encode, Some(nlog_metrics)));

        // 2. Assemble
        let prompt = PromptBundle::assemble(profile, &nlog, user_instruction);
        let prompt_metrics = TextMetrics::of(&prompt.system);
        observer.on_event(&StageEvent::succeeded(Stage::Assemble, Some(prompt_metrics)));

        // 3. Generate
        let model_id = self.backend.model_id().to_string();
        info!(
            "Generating with {} ({} records, ~{} prompt tokens)",
            backend_label(self.backend.as_ref()),
            records.len(),
            prompt_metrics.approx_tokens
        );
        observer.on_event(&StageEvent::started(Stage::Generate));

        let outcome = match self.backend.generate(&prompt.system, &prompt.user).await {
            Ok(generation) => {
                observer.on_event(&StageEvent::succeeded(
                    Stage::Generate,
                    Some(TextMetrics::of(&generation.text)),
                ));
                GenerationOutcome::Generated {
                    text: generation.text,
                    usage: generation.usage,
                }
            }
            Err(e) => {
                let diagnostic = e.to_string();
                observer.on_event(&StageEvent::failed(Stage::Generate, diagnostic.clone()));
                GenerationOutcome::Failed { diagnostic }
            }
        };

        // 4. Report
        let report = PipelineReport {
            record_count: records.len(),
            nlog,
            nlog_metrics,
            prompt,
            prompt_metrics,
            model_id,
            outcome,
            products: records
                .iter()
                .filter(|r| r.product().is_some())
                .cloned()
                .collect(),
        };
        observer.on_event(&StageEvent::succeeded(Stage::Report, None));
        report
    }
}

/// `model` or `model via url`, naming only an endpoint the backend really uses.
fn backend_label(backend: &dyn GenerationBackend) -> String {
    match backend.endpoint() {
        Some(url) => format!("{} via {url}", backend.model_id()),
        None => backend.model_id().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::GenerationError;
    use crate::generation::mock::MockBackend;
    use crate::generation::openai::OpenAiCompatibleBackend;
    use crate::records::ProductDetails;
    use crate::sample::{demo_profile, sample_records};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<StageEvent>>);

    impl StageObserver for Recorder {
        fn on_event(&self, event: &StageEvent) {
            self.0.lock().unwrap().push(event.clone());
        }
    }

    impl Recorder {
        fn trace(&self) -> Vec<(Stage, StageStatus)> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .map(|e| (e.stage, e.status.clone()))
                .collect()
        }
    }

    fn pipeline(backend: MockBackend) -> (Pipeline, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let pipeline = Pipeline::new(Arc::new(Config::default()), backend.clone());
        (pipeline, backend)
    }

    #[tokio::test]
    async fn test_run_success_event_sequence() {
        let (pipeline, backend) = pipeline(MockBackend::replying(
            "Cut the pizza.",
            TokenUsage::new(Some(100), Some(20)),
        ));
        let recorder = Recorder::default();
        let report = pipeline
            .run(&sample_records(), &demo_profile(), DEFAULT_INSTRUCTION, &recorder)
            .await;

        assert_eq!(
            recorder.trace(),
            vec![
                (Stage::Encode, StageStatus::Succeeded),
                (Stage::Assemble, StageStatus::Succeeded),
                (Stage::Generate, StageStatus::Started),
                (Stage::Generate, StageStatus::Succeeded),
                (Stage::Report, StageStatus::Succeeded),
            ]
        );
        assert_eq!(report.record_count, 15);
        assert_eq!(report.model_id, "mock");
        assert_eq!(
            report.outcome,
            GenerationOutcome::Generated {
                text: "Cut the pizza.".into(),
                usage: TokenUsage::new(Some(100), Some(20)),
            }
        );

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system, report.prompt.system);
        assert_eq!(calls[0].user, DEFAULT_INSTRUCTION);
    }

    #[tokio::test]
    async fn test_run_failure_keeps_document() {
        let (pipeline, _) = pipeline(MockBackend::failing(GenerationError::Transport(
            "connection refused".into(),
        )));
        let recorder = Recorder::default();
        let report = pipeline
            .run(&sample_records(), &demo_profile(), "why?", &recorder)
            .await;

        let trace = recorder.trace();
        assert_eq!(trace.len(), 5);
        assert!(matches!(
            &trace[3],
            (Stage::Generate, StageStatus::Failed(d)) if d.contains("connection refused")
        ));
        assert_eq!(trace[4], (Stage::Report, StageStatus::Succeeded));

        assert!(!report.outcome.is_generated());
        assert!(report.nlog.starts_with(nlog::NLOG_VERSION_LINE));
        assert!(report.prompt.system.contains(&report.nlog));
        assert_eq!(report.prompt.user, "why?");
    }

    #[tokio::test]
    async fn test_run_empty_records() {
        let (pipeline, _) = pipeline(MockBackend::default());
        let report = pipeline
            .run(&[], &demo_profile(), DEFAULT_INSTRUCTION, &NoopObserver)
            .await;
        assert_eq!(report.record_count, 0);
        assert_eq!(report.nlog.lines().count(), 3);
        assert!(report.products.is_empty());
        assert_eq!(pipeline.config().generation.max_retries, 0);
        assert!(report.outcome.is_generated());
    }

    #[tokio::test]
    async fn test_report_keeps_enriched_products() {
        let today = chrono::NaiveDate::from_ymd_opt(2025, 2, 20).unwrap();
        let mut records = sample_records();
        records.push(
            NutritionRecord::new(today, "Nutella", 539.0, 6.3, 57.5, 30.9).with_product(
                ProductDetails {
                    barcode: "3017620422003".into(),
                    ..Default::default()
                },
            ),
        );
        let (pipeline, _) = pipeline(MockBackend::default());
        let report = pipeline
            .run(&records, &demo_profile(), DEFAULT_INSTRUCTION, &NoopObserver)
            .await;

        assert_eq!(report.record_count, 16);
        assert_eq!(report.products.len(), 1);
        assert_eq!(report.products[0].name(), "Nutella");
    }

    #[test]
    fn test_backend_label_names_real_endpoint_only() {
        let mock = MockBackend::default();
        assert_eq!(backend_label(&mock), "mock");

        let config = Config::default();
        let http = OpenAiCompatibleBackend::new(&config.generation).unwrap();
        assert_eq!(
            backend_label(&http),
            "llama3.2:1b via http://localhost:11434/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_metrics_match_outputs() {
        let (pipeline, _) = pipeline(MockBackend::default());
        let recorder = Recorder::default();
        let report = pipeline
            .run(&sample_records(), &demo_profile(), DEFAULT_INSTRUCTION, &recorder)
            .await;

        assert_eq!(report.nlog_metrics, TextMetrics::of(&report.nlog));
        assert_eq!(report.prompt_metrics, TextMetrics::of(&report.prompt.system));
        let events = recorder.0.lock().unwrap();
        assert_eq!(events[0].metrics, Some(report.nlog_metrics));
        assert_eq!(events[1].metrics, Some(report.prompt_metrics));
    }
}

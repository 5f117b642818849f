use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nutrilog::config::{Config, DEFAULT_CONFIG_PATH};
use nutrilog::console::{ConsoleObserver, render_report};
use nutrilog::food_db::FoodDatabase;
use nutrilog::food_db::openfoodfacts::OpenFoodFactsClient;
use nutrilog::generation::GenerationBackend;
use nutrilog::generation::mock::MockBackend;
use nutrilog::generation::openai::OpenAiCompatibleBackend;
use nutrilog::generation::retry::{RetryBackend, RetryPolicy};
use nutrilog::pipeline::{DEFAULT_INSTRUCTION, Pipeline};
use nutrilog::records::normalize::{normalize_log_row, normalize_product, normalize_search_page};
use nutrilog::records::raw::FoodLogRow;
use nutrilog::records::{NutritionRecord, UserProfile};
use nutrilog::sample;

#[derive(Parser)]
#[command(
    name = "nutrilog",
    version,
    about = "Analyze a food log with a local language model",
    long_about = "Normalizes a food log (plus optional OpenFoodFacts products), encodes it as NLOG \
                  text, and asks an OpenAI-compatible backend for feedback."
)]
struct Cli {
    /// Question to ask about the food log
    instruction: Option<String>,

    /// Configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Food log as a JSON array of rows (defaults to the built-in sample)
    #[arg(long)]
    log: Option<PathBuf>,

    /// User profile as JSON (defaults to the demo profile)
    #[arg(long)]
    profile: Option<PathBuf>,

    /// Add an OpenFoodFacts product by barcode (repeatable)
    #[arg(long = "barcode", value_name = "CODE")]
    barcodes: Vec<String>,

    /// Add OpenFoodFacts search results for a query
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Use the offline mock backend instead of HTTP
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nutrilog=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 1. Load config
    let config = Config::load(&cli.config)?;
    config.validate().context("invalid configuration")?;
    let config = Arc::new(config);

    // 2. Local inputs
    let profile = match &cli.profile {
        Some(path) => load_profile(path)?,
        None => sample::demo_profile(),
    };
    let mut records = match &cli.log {
        Some(path) => load_log(path)?,
        None => {
            info!("No --log given, using the built-in sample log");
            sample::sample_records()
        }
    };

    // 3. Optional food database enrichment
    if !cli.barcodes.is_empty() || cli.search.is_some() {
        let client = OpenFoodFactsClient::new(&config.food_db)
            .context("failed to build food database client")?;
        records.extend(fetch_products(&client, &config, &cli.barcodes, cli.search.as_deref()).await);
    }

    // 4. Generation backend
    let backend: Arc<dyn GenerationBackend> = if cli.mock {
        Arc::new(MockBackend::default())
    } else {
        let http = OpenAiCompatibleBackend::new(&config.generation)
            .context("failed to build generation client")?;
        if config.generation.max_retries > 0 {
            Arc::new(RetryBackend::new(http, RetryPolicy::from_config(&config.generation)))
        } else {
            Arc::new(http)
        }
    };

    // 5. Run
    let instruction = cli.instruction.as_deref().unwrap_or(DEFAULT_INSTRUCTION);
    let pipeline = Pipeline::new(config.clone(), backend);
    let report = pipeline
        .run(&records, &profile, instruction, &ConsoleObserver)
        .await;

    print!("{}", render_report(&report));
    Ok(())
}

fn load_profile(path: &Path) -> Result<UserProfile> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile: {}", path.display()))?;
    let profile: UserProfile = serde_json::from_str(&data)
        .with_context(|| format!("invalid profile JSON: {}", path.display()))?;
    profile
        .validate()
        .with_context(|| format!("invalid profile: {}", path.display()))?;
    Ok(profile)
}

fn load_log(path: &Path) -> Result<Vec<NutritionRecord>> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read food log: {}", path.display()))?;
    let rows: Vec<FoodLogRow> = serde_json::from_str(&data)
        .with_context(|| format!("food log must be a JSON array of rows: {}", path.display()))?;
    info!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows.iter().map(normalize_log_row).collect())
}

/// Lookups and searches that fail are logged and skipped.
async fn fetch_products(
    db: &dyn FoodDatabase,
    config: &Config,
    barcodes: &[String],
    search: Option<&str>,
) -> Vec<NutritionRecord> {
    let today = Local::now().date_naive();
    let mut records = Vec::new();

    for code in barcodes {
        match db.lookup(code).await {
            Ok(Some(product)) => records.push(normalize_product(&product, today)),
            Ok(None) => warn!("No product found for barcode {code}, skipping"),
            Err(e) => warn!("Lookup for barcode {code} failed: {e}"),
        }
    }

    if let Some(query) = search {
        match db.search(query, config.food_db.default_page_size).await {
            Ok(page) => {
                let result = normalize_search_page(&page, today);
                info!(
                    "Search {query:?}: using {} of {} products",
                    result.records.len(),
                    result.total_count
                );
                records.extend(result.records);
            }
            Err(e) => warn!("Search {query:?} failed: {e}"),
        }
    }

    records
}

use super::{build_coordinator, emit};
use crate::config::AppConfig;
use anyhow::{Context as AnyhowContext, Result};
use clap::ValueEnum;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vana_coordination::{CoordinationTest, CoordinationTestFramework, Outcome};
use vana_protocol::QueryType;
use vana_search::SearchCoordinator;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Json,
    Markdown,
}

#[derive(Debug)]
pub struct BenchOptions {
    pub dataset: Option<PathBuf>,
    pub iterations: Option<usize>,
    pub concurrency: Option<usize>,
    pub format: ReportFormat,
    pub out: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchDataset {
    pub schema_version: u32,
    #[serde(default)]
    pub name: Option<String>,
    pub cases: Vec<BenchCase>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BenchCase {
    pub id: String,
    pub query: String,
    #[serde(default)]
    pub force_web: bool,
    #[serde(default)]
    pub expect_type: Option<QueryType>,
}

impl BenchCase {
    fn new(id: &str, query: &str, expect_type: QueryType) -> Self {
        Self {
            id: id.to_string(),
            query: query.to_string(),
            force_web: false,
            expect_type: Some(expect_type),
        }
    }
}

impl BenchDataset {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read dataset {}", path.display()))?;
        let dataset: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid dataset JSON {}", path.display()))?;
        dataset.validate()?;
        Ok(dataset)
    }

    /// One representative query per classification type.
    pub fn builtin() -> Self {
        Self {
            schema_version: 1,
            name: Some("builtin".to_string()),
            cases: vec![
                BenchCase::new(
                    "vana_orchestrator",
                    "What is VANA's orchestrator?",
                    QueryType::VanaSpecific,
                ),
                BenchCase::new(
                    "user_preferences",
                    "What are my preferred settings?",
                    QueryType::UserContext,
                ),
                BenchCase::new(
                    "weather_today",
                    "What's the weather today?",
                    QueryType::CurrentInfo,
                ),
                BenchCase::new("quicksort", "How do I implement quicksort?", QueryType::Technical),
                BenchCase::new(
                    "quarterly_summary",
                    "Summarize the quarterly report",
                    QueryType::General,
                ),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != 1 {
            anyhow::bail!(
                "Unsupported bench dataset schema_version {} (expected 1)",
                self.schema_version
            );
        }
        if self.cases.is_empty() {
            anyhow::bail!("Bench dataset must contain at least one case");
        }
        for case in &self.cases {
            if case.id.trim().is_empty() {
                anyhow::bail!("Bench dataset case id must not be empty");
            }
            if case.query.trim().is_empty() {
                anyhow::bail!("Bench dataset case '{}' query must not be empty", case.id);
            }
        }
        Ok(())
    }
}

pub async fn run_bench(config: &AppConfig, opts: BenchOptions) -> Result<()> {
    let dataset = match &opts.dataset {
        Some(path) => BenchDataset::load(path)?,
        None => BenchDataset::builtin(),
    };
    let iterations = opts.iterations.unwrap_or(config.bench.iterations);
    let concurrency = opts.concurrency.unwrap_or(config.bench.concurrency);
    if iterations == 0 {
        anyhow::bail!("--iterations must be greater than zero");
    }
    if concurrency == 0 {
        anyhow::bail!("--concurrency must be greater than zero");
    }

    log::info!(
        "Benchmarking dataset '{}' ({} cases x {} iterations, concurrency {})",
        dataset.name.as_deref().unwrap_or("unnamed"),
        dataset.cases.len(),
        iterations,
        concurrency
    );

    let coordinator = Arc::new(build_coordinator(config).await?);
    let tests = build_tests(
        &coordinator,
        &dataset,
        iterations,
        config.search.default_max_results,
    );

    let mut framework = CoordinationTestFramework::new();
    framework.run_in_batches(tests, concurrency).await?;
    let report = framework.report();
    log::info!(
        "Success rate {:.1}%, average {:.3}s, target achieved: {}",
        report.metrics.success_rate * 100.0,
        report.metrics.average_response_time,
        report.target_achieved
    );

    let body = match opts.format {
        ReportFormat::Json => report.to_json_pretty()?,
        ReportFormat::Markdown => report.render_markdown(),
    };
    emit(&body, opts.out.as_deref())
}

fn build_tests(
    coordinator: &Arc<SearchCoordinator>,
    dataset: &BenchDataset,
    iterations: usize,
    max_results: usize,
) -> Vec<CoordinationTest> {
    let mut tests = Vec::with_capacity(dataset.cases.len() * iterations);
    for iteration in 0..iterations {
        for case in &dataset.cases {
            let name = if iterations > 1 {
                format!("{}#{}", case.id, iteration + 1)
            } else {
                case.id.clone()
            };
            tests.push(case_test(
                name,
                Arc::clone(coordinator),
                case.clone(),
                max_results,
            ));
        }
    }
    tests
}

fn case_test(
    name: String,
    coordinator: Arc<SearchCoordinator>,
    case: BenchCase,
    max_results: usize,
) -> CoordinationTest {
    CoordinationTest::new(name, async move {
        let raw = coordinator
            .coordinated_search(&case.query, max_results, case.force_web)
            .await;
        let response: Value =
            serde_json::from_str(&raw).context("coordinated_search returned invalid JSON")?;

        if let (Some(expected), None) = (case.expect_type, response.get("error")) {
            let actual = response
                .pointer("/search_strategy/classification/type")
                .and_then(Value::as_str)
                .unwrap_or("none");
            if actual != expected.as_str() {
                anyhow::bail!("Classification mismatch: expected {expected}, got {actual}");
            }
        }

        Ok(Outcome::from_value(&response).with_agent("search_coordinator"))
    })
}

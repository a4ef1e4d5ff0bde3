use super::build_coordinator;
use crate::config::AppConfig;
use anyhow::Result;
use vana_protocol::{response_schema, serialize_json_pretty};
use vana_search::QueryClassifier;

pub fn run_classify(query: &str) -> Result<()> {
    let classification = QueryClassifier::classify(query);
    println!("{}", serialize_json_pretty(&classification)?);
    Ok(())
}

/// Prints the coordinator's JSON verbatim. Search failures are reported inside the JSON
/// (`error` / `fallback_error`), so the command itself still succeeds.
pub async fn run_search(
    config: &AppConfig,
    query: &str,
    max_results: Option<usize>,
    force_web: bool,
) -> Result<()> {
    let coordinator = build_coordinator(config).await?;
    let max_results = max_results.unwrap_or(config.search.default_max_results);
    if max_results == 0 {
        anyhow::bail!("--max-results must be greater than zero");
    }

    let json = coordinator
        .coordinated_search(query, max_results, force_web)
        .await;
    println!("{json}");
    Ok(())
}

pub fn run_schema() -> Result<()> {
    println!("{}", serialize_json_pretty(&response_schema()?)?);
    Ok(())
}

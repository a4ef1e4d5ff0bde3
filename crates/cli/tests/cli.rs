use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn vana(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("vana").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("VANA_CONFIG")
        .env_remove("RUST_LOG")
        .arg("--quiet");
    cmd
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn write_memory_config(dir: &TempDir) {
    fs::write(
        dir.path().join("memory.json"),
        r#"{
            "schema_version": 1,
            "entries": [
                {"id": "orchestrator", "content": "The VANA orchestrator routes requests to specialist agents", "tags": ["agents"]},
                {"id": "specialists", "content": "VANA ships architect, devops and QA specialist agents", "tags": ["agents"]},
                {"id": "editor", "content": "User prefers dark mode and vim keybindings", "tags": ["preferences"]}
            ]
        }"#,
    )
    .unwrap();
    fs::write(dir.path().join("vana.toml"), "[memory]\npath = \"memory.json\"\n").unwrap();
}

#[test]
fn classify_prints_vana_specific() {
    let dir = TempDir::new().unwrap();
    let output = vana(&dir)
        .args(["classify", "What is VANA's orchestrator?"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["type"], "vana_specific");
    assert_eq!(json["priority"], serde_json::json!(["memory", "vector"]));
    assert_eq!(json["confidence"], 0.9);
}

#[test]
fn search_without_backends_reports_error_payload() {
    let dir = TempDir::new().unwrap();
    let output = vana(&dir)
        .args(["search", "Summarize the quarterly report"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["query"], "Summarize the quarterly report");
    assert!(json["error"].as_str().unwrap().contains("not configured"));
    assert!(json.get("results").is_none());
}

#[test]
fn search_uses_memory_file_from_local_config() {
    let dir = TempDir::new().unwrap();
    write_memory_config(&dir);

    let output = vana(&dir)
        .args(["search", "What agents does VANA have?", "--max-results", "5"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["search_strategy"]["classification"]["type"], "vana_specific");
    assert_eq!(json["search_strategy"]["sources_used"], serde_json::json!(["memory"]));
    assert_eq!(json["metadata"]["memory_available"], true);
    assert_eq!(json["metadata"]["vector_available"], false);
    assert!(json["search_strategy"]["total_results"].as_u64().unwrap() >= 2);
    assert_eq!(json["results"][0]["type"], "memory_match");
}

#[test]
fn explicit_config_flag_wins() {
    let dir = TempDir::new().unwrap();
    write_memory_config(&dir);
    let missing = dir.path().join("nope.toml");

    vana(&dir)
        .arg("--config")
        .arg(&missing)
        .args(["search", "anything"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config"));
}

#[test]
fn bench_with_dataset_writes_markdown_report() {
    let dir = TempDir::new().unwrap();
    write_memory_config(&dir);
    fs::write(
        dir.path().join("dataset.json"),
        r#"{
            "schema_version": 1,
            "name": "smoke",
            "cases": [
                {"id": "agents", "query": "Which VANA agents exist?", "expect_type": "vana_specific"},
                {"id": "prefs", "query": "What do I usually prefer?", "expect_type": "user_context"},
                {"id": "weather", "query": "What's the weather today?"}
            ]
        }"#,
    )
    .unwrap();

    vana(&dir)
        .args([
            "bench",
            "--dataset",
            "dataset.json",
            "--concurrency",
            "2",
            "--format",
            "markdown",
            "--out",
            "reports/bench.md",
        ])
        .assert()
        .success();

    let report = fs::read_to_string(dir.path().join("reports/bench.md")).unwrap();
    assert!(report.starts_with("# Coordination report"));
    assert!(report.contains("## Recommendations"));
    // The weather case needs the unconfigured web tier.
    assert!(report.contains("`weather`"));
}

#[test]
fn bench_json_report_counts_builtin_cases() {
    let dir = TempDir::new().unwrap();
    write_memory_config(&dir);

    let output = vana(&dir)
        .args(["bench", "--iterations", "2"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert_eq!(json["test_summary"]["total_tests"], 10);
    assert_eq!(json["success_rate_target"], 0.9);
    assert_eq!(json["detailed_results"].as_array().unwrap().len(), 10);
    assert!(json["recommendations"].as_array().unwrap().len() >= 1);
}

#[test]
fn bench_rejects_invalid_dataset() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("empty.json"), r#"{"schema_version": 1, "cases": []}"#).unwrap();

    vana(&dir)
        .args(["bench", "--dataset", "empty.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("at least one case"));
}

#[test]
fn schema_lists_response_fields() {
    let dir = TempDir::new().unwrap();
    let output = vana(&dir).arg("schema").output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    assert!(json["properties"]["search_strategy"].is_object());
    assert!(json["properties"]["metadata"].is_object());
}

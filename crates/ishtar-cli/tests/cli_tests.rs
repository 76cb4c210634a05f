//! Integration tests for the ishtar binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const RECORDS: &str = r#"[
    {"title": "Floods in the delta", "summary": "Heavy rains displaced 12,000 people.", "link": "https://example.org/floods"},
    {"title": "Cholera response", "summary": "Three treatment centres opened."},
    {"title": "Market prices", "summary": "Staple food prices rose sharply.", "published": "2024-05-01"}
]"#;

/// Command isolated from the user's config, index and API keys
fn ishtar_cmd(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ishtar").unwrap();
    cmd.env("ISHTAR_CONFIG", data_dir.join("config.yml"))
        .env("ISHTAR_INDEX_PATH", data_dir.join("articles.index"))
        .env("ISHTAR_EMBEDDING_DIMS", "64")
        .env("ISHTAR_ENV", "test")
        .env_remove("ISHTAR_LLM_URL")
        .env_remove("VLLM_BASE_URL")
        .env_remove("OPENAI_API_KEY")
        .env_remove("TAVILY_API_KEY");
    cmd
}

fn setup_index() -> TempDir {
    let temp = TempDir::new().unwrap();
    let records = temp.path().join("records.json");
    fs::write(&records, RECORDS).unwrap();

    ishtar_cmd(temp.path())
        .arg("ingest")
        .arg(&records)
        .assert()
        .success()
        .stdout(predicate::str::contains("Ingested 3 documents"));

    temp
}

#[test]
fn test_help() {
    Command::cargo_bin("ishtar")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ingest"))
        .stdout(predicate::str::contains("ask"));
}

#[test]
fn test_health_json() {
    let temp = TempDir::new().unwrap();
    ishtar_cmd(temp.path())
        .args(["--format", "json", "health"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#"{"ok":true,"env":"test"}"#));
}

#[test]
fn test_ingest_writes_artifacts() {
    let temp = setup_index();
    assert!(temp.path().join("articles.index").exists());
    assert!(temp.path().join("articles.index.meta.json").exists());
    assert!(temp.path().join("articles.index.vectors").exists());
}

#[test]
fn test_ingest_without_sources_fails() {
    let temp = TempDir::new().unwrap();
    ishtar_cmd(temp.path())
        .arg("ingest")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to ingest"));
}

#[test]
fn test_search_after_ingest() {
    let temp = setup_index();
    ishtar_cmd(temp.path())
        .args(["search", "cholera", "treatment", "-k", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cholera response"));
}

#[test]
fn test_search_json_dedupes_reingested() {
    let temp = setup_index();
    let records = temp.path().join("records.json");
    ishtar_cmd(temp.path())
        .arg("ingest")
        .arg(&records)
        .assert()
        .success();

    let output = ishtar_cmd(temp.path())
        .args(["--format", "json", "search", "floods"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let hits: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(hits.as_array().unwrap().len(), 3);
}

#[test]
fn test_search_zero_k_is_invalid_input() {
    let temp = setup_index();
    ishtar_cmd(temp.path())
        .args(["search", "floods", "-k", "0"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("k must be > 0"));
}

#[test]
fn test_ask_without_llm_apologizes() {
    let temp = setup_index();
    ishtar_cmd(temp.path())
        .args(["ask", "how", "many", "were", "displaced?", "-k", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[unconfigured]"))
        .stdout(predicate::str::contains("Sources:"));
}

#[test]
fn test_status_reports_rows() {
    let temp = setup_index();
    ishtar_cmd(temp.path())
        .args(["--format", "json", "status"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""rows": 3"#))
        .stdout(predicate::str::contains(r#""llm_backend": null"#));
}

#[test]
fn test_unknown_backend_rejected() {
    let temp = TempDir::new().unwrap();
    ishtar_cmd(temp.path())
        .env("ISHTAR_VECTOR_BACKEND", "annoy")
        .arg("status")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Unsupported backend"));
}

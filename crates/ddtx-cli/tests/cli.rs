use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use tempfile::TempDir;

fn token(text: &str, x: f32, y: f32) -> Value {
    json!({ "text": text, "x": x, "y": y, "width": text.len() as f32 * 6.0 })
}

fn delivery_note_tokens() -> Value {
    json!({
        "pages": [[
            token("Cliente", 50.0, 820.0),
            token("Luogo di consegna", 320.0, 820.0),
            token("4681 21/05/25 1 5712", 50.0, 800.0),
            token("DONAC S.R.L.", 50.0, 740.0),
            token("DONAC S.R.L.", 320.0, 740.0),
            token("VIA ROMA 12", 50.0, 720.0),
            token("VIA SALUZZO 10", 320.0, 720.0),
            token("10100 TORINO TO", 50.0, 700.0),
            token("12030 MONASTEROLO DI SAVIGLIANO CN", 320.0, 700.0),
            token("090009 GRISSINI ST/MANO PZ 280 3,9500 1.106,00 04", 20.0, 500.0),
            token("TOTALE DOCUMENTO", 300.0, 100.0),
            token("1.150,24", 480.0, 100.0),
        ]]
    })
}

fn write_json(path: &Path, value: &Value) {
    fs::write(path, serde_json::to_string(value).unwrap()).unwrap();
}

fn ddtx() -> Command {
    Command::cargo_bin("ddtx").unwrap()
}

#[test]
fn test_process_prints_document_json() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("DDV_4681.json");
    write_json(&input, &delivery_note_tokens());

    let output = ddtx().arg("process").arg(&input).assert().success();
    let stdout = String::from_utf8(output.get_output().stdout.clone()).unwrap();
    let document: Value = serde_json::from_str(&stdout).unwrap();

    assert_eq!(document["document_type"], "delivery_note");
    assert_eq!(document["document_number"], "4681");
    assert_eq!(document["date"], "21/05/2025");
    assert_eq!(
        document["delivery_address"],
        "VIA SALUZZO 10 12030 MONASTEROLO DI SAVIGLIANO CN"
    );
    assert_eq!(document["metadata"]["address_resolution"]["kind"], "strategy");
    assert_eq!(document["metadata"]["address_resolution"]["method"], "two_column_layout");
}

#[test]
fn test_process_writes_text_output() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("DDV_4681.json");
    let output = dir.path().join("out.txt");
    write_json(&input, &delivery_note_tokens());

    ddtx()
        .arg("process")
        .arg(&input)
        .args(["-f", "text", "--show-confidence", "-o"])
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("Output written to"))
        .stdout(predicate::str::contains("two_column_layout (95%)"));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.contains("DeliveryNote 4681 del 21/05/2025"));
    assert!(text.contains("Delivery: VIA SALUZZO 10 12030 MONASTEROLO DI SAVIGLIANO CN"));
}

#[test]
fn test_process_rejects_unsupported_template() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("scan.json");
    write_json(&input, &json!({ "pages": [[token("LOREM IPSUM", 50.0, 800.0)]] }));

    ddtx()
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported template"));
}

#[test]
fn test_process_missing_input() {
    ddtx()
        .args(["process", "does-not-exist.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_process_rejects_invalid_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("DDV_4681.json");
    let config = dir.path().join("config.json");
    write_json(&input, &delivery_note_tokens());
    write_json(&config, &json!({ "address": { "confidence_threshold": 2.0 } }));

    ddtx()
        .arg("--config")
        .arg(&config)
        .arg("process")
        .arg(&input)
        .assert()
        .failure()
        .stderr(predicate::str::contains("confidence_threshold"));
}

#[test]
fn test_batch_writes_outputs_and_summary() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");
    write_json(&dir.path().join("DDV_1.json"), &delivery_note_tokens());
    write_json(&dir.path().join("DDV_2.json"), &delivery_note_tokens());
    write_json(
        &dir.path().join("broken.json"),
        &json!({ "pages": [[token("LOREM IPSUM", 50.0, 800.0)]] }),
    );

    let pattern = dir.path().join("*.json");
    ddtx()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("-o")
        .arg(&out)
        .args(["-j", "2", "--continue-on-error", "--summary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 successful, 1 failed"));

    assert!(out.join("DDV_1.json").exists());
    assert!(out.join("DDV_2.json").exists());
    assert!(!out.join("broken.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert_eq!(summary.lines().count(), 4);
    assert!(summary.contains("broken.json,error"));
}

#[test]
fn test_batch_stops_on_first_error() {
    let dir = TempDir::new().unwrap();
    write_json(
        &dir.path().join("broken.json"),
        &json!({ "pages": [[token("LOREM IPSUM", 50.0, 800.0)]] }),
    );

    let pattern = dir.path().join("*.json");
    ddtx()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn test_config_init_writes_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ddtx").join("config.json");

    ddtx()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .success();

    let config: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(config["columns"]["delivery_min_x"], 290.0);
    assert_eq!(config["address"]["column_lines"], 10);

    ddtx()
        .args(["config", "init", "--output"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn test_config_get_reads_defaults() {
    let dir = TempDir::new().unwrap();

    ddtx()
        .env("HOME", dir.path())
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["config", "get", "columns.delivery_min_x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("290"));
}

#[test]
fn test_config_set_validates_and_saves() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");

    ddtx()
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "address.confidence_threshold", "0.9"])
        .assert()
        .success();

    ddtx()
        .arg("--config")
        .arg(&path)
        .args(["config", "get", "address.confidence_threshold"])
        .assert()
        .success()
        .stdout("0.9\n");

    ddtx()
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "address.confidence_threshold", "2.0"])
        .assert()
        .failure();

    ddtx()
        .arg("--config")
        .arg(&path)
        .args(["config", "set", "address.no_such_field", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}

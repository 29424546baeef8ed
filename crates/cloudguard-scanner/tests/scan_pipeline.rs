use anyhow::Result;
use chrono::Utc;
use cloudguard_cache::{ResultCache, SnapshotCache};
use cloudguard_common::types::Severity;
use cloudguard_rules::engine::ScanEngine;
use cloudguard_scanner::config::ScannerConfig;
use cloudguard_scanner::report::ScanReport;
use cloudguard_scanner::scan_id::ScanIdGenerator;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

const FILTER: &str =
    r#"resource.type=gcs_bucket AND protoPayload.methodName="storage.setIamPermissions""#;

fn write_fixture(dir: &TempDir) -> Result<ScannerConfig> {
    let snapshot = json!({
        "metrics": {"list": {
            "global": {"data": [{
                "filter": FILTER,
                "metricDescriptor": {"type": "logging.googleapis.com/user/storage-iam"}
            }]},
            "us-east1": {"err": ["permission denied"], "data": null}
        }},
        "alertPolicies": {"list": {
            "global": {"data": [{
                "name": "projects/demo/alertPolicies/42",
                "conditions": [{"conditionThreshold": {
                    "filter": "metric.type=\"logging.googleapis.com/user/storage-iam\" resource.type=\"gcs_bucket\""
                }}]
            }]},
            "us-east1": {"data": []}
        }}
    });
    let snapshot_path = dir.path().join("cache.json");
    std::fs::write(&snapshot_path, serde_json::to_string(&snapshot)?)?;

    let output_path = dir.path().join("report.json");
    let config = format!(
        "snapshot_path = {:?}\nregions = [\"global\", \"us-east1\", \"asia-east1\"]\noutput_path = {:?}\nrules = [\"storage*\"]\nfail_on = \"unknown\"\n",
        snapshot_path.display().to_string(),
        output_path.display().to_string(),
    );
    let config_path = dir.path().join("scanner.toml");
    std::fs::write(&config_path, config)?;

    ScannerConfig::load(&config_path.display().to_string())
}

#[tokio::test]
async fn scan_writes_report_with_findings_and_sources() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_fixture(&dir)?;

    let cache: Arc<dyn ResultCache> = Arc::new(SnapshotCache::load(&config.snapshot_path)?);
    let mut engine = ScanEngine::with_builtin_rules(config.concurrency);
    engine.retain_matching(&config.rules);

    let mut scan_ids = ScanIdGenerator::new(config.machine_id, config.node_id)?;
    let outputs = engine.run_all(cache, &config.regions).await?;
    let report = ScanReport::build(scan_ids.next_id(), &engine, outputs, &config.regions, Utc::now());
    report.write(config.output_path.as_deref())?;

    let written: Value = serde_json::from_str(&std::fs::read_to_string(
        config.output_path.as_deref().expect("output path configured"),
    )?)?;

    assert_eq!(written["scan_id"], report.scan_id.to_string());

    let rule = &written["rules"][0];
    assert_eq!(rule["metadata"]["id"], "storagePermissionsLogging");
    assert_eq!(rule["metadata"]["apis"], json!(["metrics:list", "alertPolicies:list"]));

    let findings = rule["findings"].as_array().expect("findings array");
    assert_eq!(findings.len(), 2, "asia-east1 has no cached inputs");
    assert_eq!(findings[0]["severity"], "ok");
    assert_eq!(findings[0]["resource"], "projects/demo/alertPolicies/42");
    assert_eq!(findings[1]["severity"], "unknown");
    assert_eq!(findings[1]["region"], "us-east1");

    assert!(rule["source"]["metrics"]["list"]["us-east1"]["err"].is_array());
    assert_eq!(written["summary"], json!({"ok": 1, "warn": 0, "fail": 0, "unknown": 1}));

    assert_eq!(config.fail_on, Some(Severity::Unknown));
    assert!(report.exceeds(Severity::Unknown));
    Ok(())
}

#[tokio::test]
async fn scan_with_no_matching_rules_produces_empty_report() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let config = write_fixture(&dir)?;

    let cache: Arc<dyn ResultCache> = Arc::new(SnapshotCache::load(&config.snapshot_path)?);
    let mut engine = ScanEngine::with_builtin_rules(config.concurrency);
    engine.retain_matching(&["iam*".to_string()]);

    let mut scan_ids = ScanIdGenerator::new(config.machine_id, config.node_id)?;
    let outputs = engine.run_all(cache, &config.regions).await?;
    let report = ScanReport::build(scan_ids.next_id(), &engine, outputs, &config.regions, Utc::now());

    assert!(report.rules.is_empty());
    assert_eq!(report.worst_severity(), None);
    Ok(())
}

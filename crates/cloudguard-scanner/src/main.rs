use anyhow::Result;
use chrono::Utc;
use cloudguard_cache::{ResultCache, SnapshotCache};
use cloudguard_rules::engine::ScanEngine;
use cloudguard_scanner::config::ScannerConfig;
use cloudguard_scanner::report::ScanReport;
use cloudguard_scanner::scan_id::ScanIdGenerator;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[allow(clippy::print_stderr)]
fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cloudguard-scanner [config.toml]     Run all selected rules against the cache snapshot");
    eprintln!("  cloudguard-scanner list-rules        List built-in rules");
}

#[allow(clippy::print_stdout)]
fn list_rules() {
    let engine = ScanEngine::with_builtin_rules(1);
    for rule in engine.rules() {
        let meta = rule.metadata();
        println!("{:<28} {:<12} {}", meta.id, meta.category, meta.title);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("cloudguard=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        Some("list-rules") => {
            list_rules();
            Ok(())
        }
        Some("--help" | "-h") => {
            print_usage();
            Ok(())
        }
        _ => {
            let config_path = args
                .get(1)
                .map(|s| s.as_str())
                .unwrap_or("config/scanner.toml");
            run_scan(config_path).await
        }
    }
}

async fn run_scan(config_path: &str) -> Result<()> {
    let config = ScannerConfig::load(config_path)?;
    let mut scan_ids = ScanIdGenerator::new(config.machine_id, config.node_id)?;

    let cache: Arc<dyn ResultCache> = Arc::new(SnapshotCache::load(&config.snapshot_path)?);

    let mut engine = ScanEngine::with_builtin_rules(config.concurrency);
    engine.retain_matching(&config.rules);
    if engine.rules().is_empty() {
        tracing::warn!(patterns = ?config.rules, "No rules matched the configured patterns");
    }

    tracing::info!(
        rules = engine.rules().len(),
        regions = config.regions.len(),
        concurrency = config.concurrency,
        "cloudguard-scanner starting"
    );

    let started_at = Utc::now();
    let outputs = engine.run_all(cache, &config.regions).await?;
    let report = ScanReport::build(scan_ids.next_id(), &engine, outputs, &config.regions, started_at);

    tracing::info!(
        scan_id = %report.scan_id,
        ok = report.summary.ok,
        warn = report.summary.warn,
        fail = report.summary.fail,
        unknown = report.summary.unknown,
        "Scan complete"
    );

    report.write(config.output_path.as_deref())?;

    if let Some(threshold) = config.fail_on {
        if report.exceeds(threshold) {
            anyhow::bail!("findings at or above {threshold} were reported");
        }
    }

    Ok(())
}

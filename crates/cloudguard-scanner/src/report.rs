use crate::scan_id::ScanId;
use chrono::{DateTime, Utc};
use cloudguard_cache::SourceAccumulator;
use cloudguard_common::types::{Finding, RuleMetadata, Severity};
use cloudguard_rules::engine::ScanEngine;
use cloudguard_rules::RuleOutput;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeveritySummary {
    pub ok: usize,
    pub warn: usize,
    pub fail: usize,
    pub unknown: usize,
}

impl SeveritySummary {
    fn add(&mut self, severity: Severity) {
        match severity {
            Severity::Ok => self.ok += 1,
            Severity::Warn => self.warn += 1,
            Severity::Fail => self.fail += 1,
            Severity::Unknown => self.unknown += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RuleReport {
    pub metadata: RuleMetadata,
    pub findings: Vec<Finding>,
    pub source: SourceAccumulator,
}

/// Result of one scanner run across all selected rules.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub scan_id: ScanId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub regions: Vec<String>,
    pub rules: Vec<RuleReport>,
    pub summary: SeveritySummary,
}

impl ScanReport {
    pub fn build(
        scan_id: ScanId,
        engine: &ScanEngine,
        outputs: Vec<RuleOutput>,
        regions: &[String],
        started_at: DateTime<Utc>,
    ) -> Self {
        let mut summary = SeveritySummary::default();
        let mut rules = Vec::with_capacity(outputs.len());

        for output in outputs {
            let Some(rule) = engine.get_rule(&output.rule_id) else {
                tracing::warn!(rule_id = %output.rule_id, "Output for unregistered rule dropped");
                continue;
            };
            for finding in &output.findings {
                summary.add(finding.severity);
            }
            rules.push(RuleReport {
                metadata: rule.metadata().clone(),
                findings: output.findings,
                source: output.source,
            });
        }

        Self {
            scan_id,
            started_at,
            finished_at: Utc::now(),
            regions: regions.to_vec(),
            rules,
            summary,
        }
    }

    /// Highest severity across all findings, if any were produced.
    pub fn worst_severity(&self) -> Option<Severity> {
        self.rules
            .iter()
            .flat_map(|r| r.findings.iter())
            .map(|f| f.severity)
            .max()
    }

    /// Whether any finding is at or above `threshold`.
    pub fn exceeds(&self, threshold: Severity) -> bool {
        self.worst_severity().is_some_and(|worst| worst >= threshold)
    }

    /// Write the report as pretty JSON to `path`, or stdout when `None`.
    #[allow(clippy::print_stdout)]
    pub fn write(&self, path: Option<&str>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        match path {
            Some(path) => {
                std::fs::write(path, json)
                    .map_err(|e| anyhow::anyhow!("Failed to write report '{}': {}", path, e))?;
                tracing::info!(path = %path, "Report written");
            }
            None => println!("{json}"),
        }
        Ok(())
    }
}

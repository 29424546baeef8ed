use crate::error::{Result, RuleError};
use crate::{ComplianceRule, RuleOutput};
use cloudguard_cache::{ResultCache, SourceAccumulator};
use cloudguard_common::types::Finding;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Evaluate `rule` for every region concurrently and join the outcomes.
///
/// At most `concurrency` regions are in flight at once; the bound is clamped
/// to what a [`Semaphore`] can hold. Findings and source
/// entries are appended in `regions` order once every task has finished,
/// so repeated runs over the same cache produce the same output.
///
/// # Errors
///
/// Returns [`RuleError::RegionTask`] if a region task panicked.
pub async fn run_rule(
    rule: Arc<dyn ComplianceRule>,
    cache: Arc<dyn ResultCache>,
    regions: &[String],
    concurrency: usize,
) -> Result<RuleOutput> {
    let semaphore = Arc::new(Semaphore::new(concurrency.clamp(1, Semaphore::MAX_PERMITS)));
    let mut tasks = Vec::with_capacity(regions.len());

    for region in regions {
        let sem = Arc::clone(&semaphore);
        let rule = Arc::clone(&rule);
        let cache = Arc::clone(&cache);
        let task_region = region.clone();

        let task = tokio::spawn(async move {
            let _permit = sem.acquire().await;
            let mut source = SourceAccumulator::new();
            let finding = rule
                .evaluate_region(cache.as_ref(), &task_region, &mut source)
                .await;
            (finding, source)
        });

        tasks.push((region.clone(), task));
    }

    let rule_id = rule.id().to_string();
    let mut findings: Vec<Finding> = Vec::with_capacity(regions.len());
    let mut source = SourceAccumulator::new();

    for (region, task) in tasks {
        match task.await {
            Ok((finding, region_source)) => {
                if let Some(finding) = finding {
                    tracing::debug!(
                        rule_id = %rule_id,
                        region = %region,
                        severity = %finding.severity,
                        message = %finding.message,
                        "Region evaluated"
                    );
                    findings.push(finding);
                }
                source.merge(region_source);
            }
            Err(e) => {
                tracing::error!(rule_id = %rule_id, region = %region, "Region task failed: {}", e);
                return Err(RuleError::RegionTask {
                    rule_id,
                    region,
                    source: e,
                });
            }
        }
    }

    tracing::info!(
        rule_id = %rule_id,
        regions = regions.len(),
        findings = findings.len(),
        "Rule evaluated"
    );

    Ok(RuleOutput {
        rule_id,
        findings,
        source,
    })
}

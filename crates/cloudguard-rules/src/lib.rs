//! Compliance rules evaluated against a region-scoped result cache.
//!
//! Every rule reads previously fetched API results out of a
//! [`ResultCache`], produces at most one [`Finding`] per region, and records
//! the cache entries it consulted in a [`SourceAccumulator`]. The
//! [`runner`] fans a rule out across regions; the [`engine::ScanEngine`]
//! holds the registered rules and runs them in turn.

pub mod correlation;
pub mod engine;
pub mod error;
pub mod google;
pub mod rules;
pub mod runner;
pub mod triage;


use cloudguard_cache::{ResultCache, SourceAccumulator};
use cloudguard_common::types::{Finding, RuleMetadata};
use serde::Serialize;

/// A compliance check evaluated independently per region.
///
/// Implementations are registered in the [`engine::ScanEngine`] and driven
/// by [`runner::run_rule`], which evaluates every configured region
/// concurrently and joins the outcomes before returning.
#[async_trait::async_trait]
pub trait ComplianceRule: Send + Sync {
    /// Static descriptive data exposed to the orchestrator.
    fn metadata(&self) -> &RuleMetadata;

    /// Unique identifier for this rule (e.g., `"storagePermissionsLogging"`).
    fn id(&self) -> &str {
        self.metadata().id
    }

    /// Evaluates one region.
    ///
    /// Returns `None` only when a required collection was never populated
    /// for `region`; otherwise exactly one finding.
    async fn evaluate_region(
        &self,
        cache: &dyn ResultCache,
        region: &str,
        source: &mut SourceAccumulator,
    ) -> Option<Finding>;
}

/// Everything one rule invocation hands back to its caller.
#[derive(Debug, Clone, Serialize)]
pub struct RuleOutput {
    pub rule_id: String,
    pub findings: Vec<Finding>,
    pub source: SourceAccumulator,
}

//! Fault triage for the metric/alert-policy pair.
//!
//! Before any correlation runs, the two fetched collections are checked in a
//! fixed order and the first failing check becomes the region's finding.

use crate::google::{AlertPolicy, LogMetric};
use cloudguard_cache::{describe_errors, Fetched};
use cloudguard_common::types::{Finding, Severity};

/// One guard in the triage chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriageStep {
    MetricsUnavailable,
    AlertPoliciesUnavailable,
    NoMetrics,
    NoAlertPolicies,
}

/// Evaluation order of the triage chain; the first step that fires wins.
pub const TRIAGE_ORDER: [TriageStep; 4] = [
    TriageStep::MetricsUnavailable,
    TriageStep::AlertPoliciesUnavailable,
    TriageStep::NoMetrics,
    TriageStep::NoAlertPolicies,
];

/// Result of running the triage chain for one region.
#[derive(Debug, PartialEq)]
pub enum Triage<'a> {
    /// A required collection was never populated; emit nothing.
    Skip,
    /// A guard fired.
    Finding(Finding),
    /// Both collections hold data; correlation may run.
    Proceed {
        metrics: &'a [LogMetric],
        policies: &'a [AlertPolicy],
    },
}

impl TriageStep {
    fn check(
        self,
        metrics: &Fetched<LogMetric>,
        policies: &Fetched<AlertPolicy>,
        region: &str,
    ) -> Option<Finding> {
        match self {
            TriageStep::MetricsUnavailable => unavailable(metrics, "log metrics", region),
            TriageStep::AlertPoliciesUnavailable => {
                unavailable(policies, "log alert policies", region)
            }
            TriageStep::NoMetrics => empty(metrics, "No log metrics found", region),
            TriageStep::NoAlertPolicies => empty(policies, "No log alert policies found", region),
        }
    }
}

fn unavailable<T>(fetched: &Fetched<T>, what: &str, region: &str) -> Option<Finding> {
    let Fetched::Failed(errors) = fetched else {
        return None;
    };
    Some(
        Finding::new(
            Severity::Unknown,
            format!("Unable to query for {what}: {}", describe_errors(errors)),
            region,
        )
        .with_extra(errors.clone()),
    )
}

fn empty<T>(fetched: &Fetched<T>, message: &str, region: &str) -> Option<Finding> {
    match fetched {
        Fetched::Data(items) if items.is_empty() => {
            Some(Finding::new(Severity::Fail, message, region))
        }
        _ => None,
    }
}

/// Run the triage chain over both collections for `region`.
pub fn triage<'a>(
    metrics: &'a Fetched<LogMetric>,
    policies: &'a Fetched<AlertPolicy>,
    region: &str,
) -> Triage<'a> {
    if matches!(metrics, Fetched::Absent) || matches!(policies, Fetched::Absent) {
        return Triage::Skip;
    }

    if let Some(finding) = TRIAGE_ORDER
        .iter()
        .find_map(|step| step.check(metrics, policies, region))
    {
        return Triage::Finding(finding);
    }

    match (metrics, policies) {
        (Fetched::Data(metrics), Fetched::Data(policies)) => Triage::Proceed { metrics, policies },
        // Failed collections were turned into findings by the chain above.
        _ => Triage::Skip,
    }
}

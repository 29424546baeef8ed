//! Correlation of log-based metrics with alert-policy conditions.
//!
//! A control is in place when an enabled log metric carries the expected
//! filter AND some alert condition's threshold filter watches that metric.

use crate::google::{self, AlertPolicy, LogMetric};
use crate::triage::{self, Triage};
use cloudguard_cache::{ResultCache, SourceAccumulator};
use cloudguard_common::types::{Finding, Severity};

/// Outcome of scanning metric definitions for the target filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricMatch<'a> {
    /// First enabled metric with the target filter; carries its descriptor type.
    Enabled(&'a str),
    /// Only disabled metrics carry the target filter.
    Disabled,
    NotFound,
}

/// Scan `metrics` in order for a trimmed filter equal to `target_filter`.
///
/// Stops at the first enabled match. A disabled match is only reported when
/// no enabled match exists anywhere in the list.
pub fn scan_metrics<'a>(metrics: &'a [LogMetric], target_filter: &str) -> MetricMatch<'a> {
    let mut disabled = false;
    for metric in metrics {
        let Some(filter) = metric.filter() else {
            continue;
        };
        if filter.trim() != target_filter {
            continue;
        }
        if metric.is_disabled() {
            disabled = true;
        } else {
            return MetricMatch::Enabled(metric.descriptor_type());
        }
    }

    if disabled {
        MetricMatch::Disabled
    } else {
        MetricMatch::NotFound
    }
}

/// The metric identifier a threshold filter watches: the text between the
/// first pair of double quotes.
///
/// # Examples
///
/// ```
/// use cloudguard_rules::correlation::quoted_metric_id;
///
/// assert_eq!(
///     quoted_metric_id(r#"metric.type="custom.googleapis.com/m1" AND x"#),
///     Some("custom.googleapis.com/m1")
/// );
/// assert_eq!(quoted_metric_id("metric.type=unquoted"), None);
/// ```
pub fn quoted_metric_id(filter: &str) -> Option<&str> {
    filter.split('"').nth(1)
}

/// First alert policy, in order, with a condition watching `metric_id`.
///
/// Conditions are visited policy by policy; the first hit ends the scan.
pub fn find_alert_policy<'a>(policies: &'a [AlertPolicy], metric_id: &str) -> Option<&'a AlertPolicy> {
    policies
        .iter()
        .flat_map(|policy| policy.conditions().iter().map(move |c| (policy, c)))
        .find(|(_, condition)| {
            condition.threshold_filter().and_then(quoted_metric_id) == Some(metric_id)
        })
        .map(|(policy, _)| policy)
}

/// Reusable "log metric plus alert" check.
///
/// `subject` names the monitored activity in finding messages, e.g.
/// `"storage permission changes"`.
#[derive(Debug, Clone, Copy)]
pub struct LogMetricAlertCheck {
    pub subject: &'static str,
    pub target_filter: &'static str,
}

impl LogMetricAlertCheck {
    /// Resolve, triage and correlate one region.
    pub async fn evaluate_region(
        &self,
        cache: &dyn ResultCache,
        region: &str,
        source: &mut SourceAccumulator,
    ) -> Option<Finding> {
        let metrics = google::fetch_metrics(cache, source, region).await;
        let policies = google::fetch_alert_policies(cache, source, region).await;

        match triage::triage(&metrics, &policies, region) {
            Triage::Skip => {
                tracing::warn!(
                    region = %region,
                    subject = self.subject,
                    "Metrics or alert policies not cached for region, skipping"
                );
                None
            }
            Triage::Finding(finding) => Some(finding),
            Triage::Proceed { metrics, policies } => {
                Some(self.correlate(metrics, policies, region))
            }
        }
    }

    /// Reduce populated collections into the region's finding.
    pub fn correlate(&self, metrics: &[LogMetric], policies: &[AlertPolicy], region: &str) -> Finding {
        let metric_id = match scan_metrics(metrics, self.target_filter) {
            MetricMatch::Disabled => {
                return Finding::new(
                    Severity::Fail,
                    format!("Log metric for {} is disabled", self.subject),
                    region,
                );
            }
            MetricMatch::Enabled(id) if !id.is_empty() => id,
            MetricMatch::Enabled(_) | MetricMatch::NotFound => {
                return Finding::new(
                    Severity::Fail,
                    format!("Log metric for {} not found", self.subject),
                    region,
                );
            }
        };

        match find_alert_policy(policies, metric_id) {
            Some(policy) => Finding::new(
                Severity::Ok,
                format!("Log alert for {} is enabled", self.subject),
                region,
            )
            .with_resource(policy.name.clone()),
            None => Finding::new(
                Severity::Fail,
                format!("Log alert for {} not found", self.subject),
                region,
            ),
        }
    }
}

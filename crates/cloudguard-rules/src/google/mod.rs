//! Google Cloud Logging and Monitoring resources as cached by the collector.
//!
//! Field names follow the REST wire shape (camelCase), so cached API
//! responses decode without translation.

use cloudguard_cache::{CachePath, Fetched, ResultCache, SourceAccumulator};
use serde::{Deserialize, Serialize};

pub const METRICS: &str = "metrics";
pub const ALERT_POLICIES: &str = "alertPolicies";
pub const LIST: &str = "list";

/// Logging and monitoring APIs are not regional; the collector files them
/// under this pseudo-region.
pub const GLOBAL_REGION: &str = "global";

/// A log-based metric definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogMetric {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub disabled: Option<bool>,
    #[serde(default)]
    pub metric_descriptor: Option<MetricDescriptor>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricDescriptor {
    #[serde(default, rename = "type")]
    pub descriptor_type: Option<String>,
}

impl LogMetric {
    /// The filter expression, if present and non-empty.
    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.is_empty())
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    /// Metric type identifier that alert conditions reference, or `""`.
    pub fn descriptor_type(&self) -> &str {
        self.metric_descriptor
            .as_ref()
            .and_then(|d| d.descriptor_type.as_deref())
            .unwrap_or("")
    }
}

/// A Cloud Monitoring alert policy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertPolicy {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub conditions: Option<Vec<AlertCondition>>,
}

impl AlertPolicy {
    pub fn conditions(&self) -> &[AlertCondition] {
        self.conditions.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertCondition {
    #[serde(default)]
    pub condition_threshold: Option<ConditionThreshold>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionThreshold {
    #[serde(default)]
    pub filter: Option<String>,
}

impl AlertCondition {
    /// The threshold filter, if present and non-empty.
    pub fn threshold_filter(&self) -> Option<&str> {
        self.condition_threshold
            .as_ref()
            .and_then(|t| t.filter.as_deref())
            .filter(|f| !f.is_empty())
    }
}

/// Resolve `metrics:list` for `region`.
pub async fn fetch_metrics(
    cache: &dyn ResultCache,
    source: &mut SourceAccumulator,
    region: &str,
) -> Fetched<LogMetric> {
    source
        .fetch(cache, CachePath::new(METRICS, LIST, region))
        .await
}

/// Resolve `alertPolicies:list` for `region`.
pub async fn fetch_alert_policies(
    cache: &dyn ResultCache,
    source: &mut SourceAccumulator,
    region: &str,
) -> Fetched<AlertPolicy> {
    source
        .fetch(cache, CachePath::new(ALERT_POLICIES, LIST, region))
        .await
}

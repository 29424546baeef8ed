use crate::correlation::LogMetricAlertCheck;
use crate::ComplianceRule;
use cloudguard_cache::{ResultCache, SourceAccumulator};
use cloudguard_common::types::{ComplianceMapping, Finding, RuleMetadata};

/// Log filter selecting IAM policy changes on Cloud Storage buckets.
pub const STORAGE_PERMISSIONS_FILTER: &str =
    r#"resource.type=gcs_bucket AND protoPayload.methodName="storage.setIamPermissions""#;

pub static METADATA: RuleMetadata = RuleMetadata {
    id: "storagePermissionsLogging",
    title: "Storage Permissions Logging",
    category: "Logging",
    domain: "Management and Governance",
    description: "Ensures that logging and log alerts exist for storage permission changes",
    more_info: "Storage permissions include access to the buckets that store the logs, any \
                changes in storage permissions should be heavily monitored to prevent \
                unauthorized changes.",
    link: "https://cloud.google.com/logging/docs/logs-based-metrics/",
    recommended_action: "Ensure that log metric and alert for storage permission changes.",
    apis: &["metrics:list", "alertPolicies:list"],
    compliance: &[
        ComplianceMapping {
            framework: "pci",
            text: "PCI requires tracking and monitoring of all access to environments in which \
                   cardholder data is present. Storage permissions logging helps ensure that \
                   any storage permissions changes, including permissions in the log storage \
                   bucket, are recorded.",
        },
        ComplianceMapping {
            framework: "hipaa",
            text: "HIPAA requires the logging of all activity including access and all actions \
                   taken.",
        },
    ],
};

/// Requires a log metric on bucket IAM changes and an alert watching it.
pub struct StoragePermissionsLogging {
    check: LogMetricAlertCheck,
}

impl StoragePermissionsLogging {
    pub fn new() -> Self {
        Self {
            check: LogMetricAlertCheck {
                subject: "storage permission changes",
                target_filter: STORAGE_PERMISSIONS_FILTER,
            },
        }
    }
}

impl Default for StoragePermissionsLogging {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ComplianceRule for StoragePermissionsLogging {
    fn metadata(&self) -> &RuleMetadata {
        &METADATA
    }

    async fn evaluate_region(
        &self,
        cache: &dyn ResultCache,
        region: &str,
        source: &mut SourceAccumulator,
    ) -> Option<Finding> {
        self.check.evaluate_region(cache, region, source).await
    }
}

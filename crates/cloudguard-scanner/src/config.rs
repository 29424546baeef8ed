use crate::scan_id::check_worker_ids;
use cloudguard_common::types::Severity;
use serde::{Deserialize, Deserializer};

#[derive(Debug, Clone, Deserialize)]
pub struct ScannerConfig {
    /// JSON snapshot of the collector's result cache.
    pub snapshot_path: String,
    #[serde(
        default = "default_regions",
        alias = "region",
        deserialize_with = "deserialize_regions"
    )]
    pub regions: Vec<String>,
    /// Maximum regions evaluated concurrently per rule.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Glob patterns selecting rule IDs to run.
    #[serde(default = "default_rules")]
    pub rules: Vec<String>,
    /// Where to write the JSON report; stdout when unset.
    #[serde(default)]
    pub output_path: Option<String>,
    /// Exit non-zero when any finding is at or above this severity.
    #[serde(default)]
    pub fail_on: Option<Severity>,
    /// Snowflake worker IDs for scan IDs (0-31 each).
    #[serde(default = "default_worker_id")]
    pub machine_id: i32,
    #[serde(default = "default_worker_id")]
    pub node_id: i32,
}

/// Upper bound on `concurrency`.
pub const MAX_CONCURRENCY: usize = 1024;

fn default_regions() -> Vec<String> {
    vec![cloudguard_rules::google::GLOBAL_REGION.to_string()]
}

fn default_concurrency() -> usize {
    5
}

fn default_worker_id() -> i32 {
    1
}

fn default_rules() -> Vec<String> {
    vec!["*".to_string()]
}

fn deserialize_regions<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RegionsInput {
        One(String),
        Many(Vec<String>),
    }

    match RegionsInput::deserialize(deserializer)? {
        RegionsInput::One(region) => Ok(vec![region]),
        RegionsInput::Many(regions) => Ok(regions),
    }
}

impl ScannerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        if config.regions.is_empty() {
            anyhow::bail!("config must list at least one region");
        }
        if !(1..=MAX_CONCURRENCY).contains(&config.concurrency) {
            anyhow::bail!(
                "concurrency must be between 1 and {MAX_CONCURRENCY}, got {}",
                config.concurrency
            );
        }
        check_worker_ids(config.machine_id, config.node_id)?;
        Ok(config)
    }
}

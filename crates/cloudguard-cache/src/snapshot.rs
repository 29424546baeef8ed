use crate::error::{CacheError, Result};
use crate::{CachePath, ResultCache};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

type RegionEntries = HashMap<String, Value>;
type OperationEntries = HashMap<String, RegionEntries>;

/// In-memory cache materialized from a collector's JSON snapshot.
///
/// The snapshot layout mirrors the cache key hierarchy:
///
/// ```json
/// { "metrics": { "list": { "global": { "data": [ ... ] } } } }
/// ```
///
/// Region entries are kept as raw JSON; their shape is checked when a rule
/// reads them, so one malformed entry only affects its own region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnapshotCache {
    entries: HashMap<String, OperationEntries>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the file cannot be read,
    /// [`CacheError::JsonError`] if it does not match the cache layout, and
    /// [`CacheError::InvalidSnapshot`] if any key in the hierarchy is blank.
    /// Malformed region entries are not load errors.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cache = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            entries = cache.len(),
            "Loaded cache snapshot"
        );
        Ok(cache)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let cache: Self = serde_json::from_str(content)?;
        cache.validate()?;
        Ok(cache)
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let cache: Self = serde_json::from_value(value)?;
        cache.validate()?;
        Ok(cache)
    }

    pub fn insert(&mut self, path: CachePath, result: Value) {
        self.entries
            .entry(path.collection)
            .or_default()
            .entry(path.operation)
            .or_default()
            .insert(path.region, result);
    }

    pub fn get(&self, path: &CachePath) -> Option<&Value> {
        self.entries
            .get(&path.collection)?
            .get(&path.operation)?
            .get(&path.region)
    }

    /// Number of populated (collection, operation, region) entries.
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|ops| ops.values())
            .map(|regions| regions.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn validate(&self) -> Result<()> {
        for (collection, operations) in &self.entries {
            if collection.trim().is_empty() {
                return Err(CacheError::InvalidSnapshot("blank collection name".to_string()));
            }
            for (operation, regions) in operations {
                if operation.trim().is_empty() {
                    return Err(CacheError::InvalidSnapshot(format!(
                        "blank operation name under '{collection}'"
                    )));
                }
                if regions.keys().any(|r| r.trim().is_empty()) {
                    return Err(CacheError::InvalidSnapshot(format!(
                        "blank region under '{collection}:{operation}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResultCache for SnapshotCache {
    async fn lookup(&self, path: &CachePath) -> Option<Value> {
        self.get(path).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn should_look_up_entries_by_collection_operation_and_region() {
        let cache = SnapshotCache::from_value(json!({
            "metrics": {"list": {"global": {"data": [{"filter": "x"}]}}}
        }))
        .unwrap();

        assert_eq!(cache.len(), 1);
        let hit = cache
            .lookup(&CachePath::new("metrics", "list", "global"))
            .await
            .expect("entry should exist");
        assert_eq!(hit["data"].as_array().map(|d| d.len()), Some(1));
        assert!(cache
            .lookup(&CachePath::new("metrics", "list", "us-east1"))
            .await
            .is_none());
        assert!(cache
            .lookup(&CachePath::new("alertPolicies", "list", "global"))
            .await
            .is_none());
    }

    #[test]
    fn should_reject_blank_region_keys() {
        let err = SnapshotCache::from_value(json!({
            "metrics": {"list": {" ": {"data": []}}}
        }))
        .unwrap_err();
        assert!(matches!(err, CacheError::InvalidSnapshot(_)));
    }

    #[test]
    fn should_keep_malformed_region_entries_without_rejecting_snapshot() {
        let cache = SnapshotCache::from_value(json!({
            "metrics": {"list": {
                "global": {"data": [{"filter": "x"}]},
                "us-east1": {"data": {"filter": "x"}},
                "europe-west1": null
            }}
        }))
        .unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(
            cache.get(&CachePath::new("metrics", "list", "europe-west1")),
            Some(&Value::Null)
        );
    }

    #[test]
    fn should_reject_snapshot_that_is_not_nested_by_collection_and_operation() {
        let err = SnapshotCache::from_value(json!({"metrics": ["global"]})).unwrap_err();
        assert!(matches!(err, CacheError::JsonError(_)));
    }

    #[test]
    fn should_load_snapshot_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"alertPolicies": {{"list": {{"global": {{"err": ["denied"]}}}}}}}}"#
        )
        .unwrap();

        let cache = SnapshotCache::load(file.path()).unwrap();
        let entry = cache
            .get(&CachePath::new("alertPolicies", "list", "global"))
            .unwrap();
        assert_eq!(entry["err"], json!(["denied"]));
    }

    #[test]
    fn should_report_io_error_for_missing_file() {
        let err = SnapshotCache::load("/nonexistent/cache.json").unwrap_err();
        assert!(matches!(err, CacheError::Io { .. }));
    }
}

use crate::{CachePath, Fetched, ResultCache};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

type RegionSources = BTreeMap<String, Value>;
type OperationSources = BTreeMap<String, RegionSources>;

/// Record of every cache entry a rule consulted, keyed like the cache itself.
///
/// Absent lookups are not recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SourceAccumulator {
    entries: BTreeMap<String, OperationSources>,
}

impl SourceAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `path` in `cache`, recording the retrieved entry.
    pub async fn resolve(
        &mut self,
        cache: &dyn ResultCache,
        path: CachePath,
    ) -> Option<Value> {
        let result = cache.lookup(&path).await;
        if let Some(ref entry) = result {
            self.record(path, entry.clone());
        }
        result
    }

    /// Look up `path` and decode it into a typed [`Fetched`].
    pub async fn fetch<T: DeserializeOwned>(
        &mut self,
        cache: &dyn ResultCache,
        path: CachePath,
    ) -> Fetched<T> {
        let path_display = path.to_string();
        let fetched = Fetched::from_raw(self.resolve(cache, path).await);
        match &fetched {
            Fetched::Absent => tracing::debug!(path = %path_display, "Cache entry absent"),
            Fetched::Failed(errors) => {
                tracing::debug!(path = %path_display, errors = ?errors, "Cache entry failed")
            }
            Fetched::Data(items) => {
                tracing::trace!(path = %path_display, count = items.len(), "Cache entry resolved")
            }
        }
        fetched
    }

    pub fn record(&mut self, path: CachePath, result: Value) {
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

    /// Fold another accumulator's entries into this one.
    pub fn merge(&mut self, other: SourceAccumulator) {
        for (collection, operations) in other.entries {
            let target = self.entries.entry(collection).or_default();
            for (operation, regions) in operations {
                target.entry(operation).or_default().extend(regions);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

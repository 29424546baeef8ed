//! Region-scoped cache of previously fetched cloud API responses.
//!
//! Rules never talk to cloud APIs directly. A collector populates a cache
//! keyed by collection, operation and region, and rules read from it through
//! [`ResultCache`]. Every lookup a rule makes is mirrored into a
//! [`SourceAccumulator`] so reports can show exactly which data a finding was
//! derived from.

pub mod error;
pub mod fetch;
pub mod snapshot;
pub mod source;

pub use fetch::{describe_errors, CachePath, FetchResult, Fetched};
pub use snapshot::SnapshotCache;
pub use source::SourceAccumulator;

/// Read-only access to cached API results.
///
/// Entries are returned as stored, shaped like a [`FetchResult`] when the
/// collector behaved. `None` means the path was never populated for this
/// run, which is distinct from a populated result that carries errors.
#[async_trait::async_trait]
pub trait ResultCache: Send + Sync {
    async fn lookup(&self, path: &CachePath) -> Option<serde_json::Value>;
}

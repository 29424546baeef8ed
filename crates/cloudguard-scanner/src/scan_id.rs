use serde::{Serialize, Serializer};
use snowflake::SnowflakeIdBucket;
use std::fmt;

/// Largest machine or node ID a Snowflake bucket can encode (5 bits each).
pub const MAX_WORKER_ID: i32 = 31;

/// Identifier of one scanner run.
///
/// Serialized as a decimal string so JSON consumers do not lose precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScanId(i64);

impl ScanId {
    pub fn as_i64(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ScanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ScanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Check that `machine_id` and `node_id` fit a Snowflake bucket.
pub fn check_worker_ids(machine_id: i32, node_id: i32) -> anyhow::Result<()> {
    for (name, value) in [("machine_id", machine_id), ("node_id", node_id)] {
        if !(0..=MAX_WORKER_ID).contains(&value) {
            anyhow::bail!("{name} must be between 0 and {MAX_WORKER_ID}, got {value}");
        }
    }
    Ok(())
}

/// Issues time-ordered, unique [`ScanId`]s for one scanner process.
pub struct ScanIdGenerator {
    bucket: SnowflakeIdBucket,
}

impl ScanIdGenerator {
    pub fn new(machine_id: i32, node_id: i32) -> anyhow::Result<Self> {
        check_worker_ids(machine_id, node_id)?;
        Ok(Self {
            bucket: SnowflakeIdBucket::new(machine_id, node_id),
        })
    }

    pub fn next_id(&mut self) -> ScanId {
        ScanId(self.bucket.get_id())
    }
}

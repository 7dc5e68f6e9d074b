// Mon Feb 02 2026 - Alex

use crate::engine::error::EngineError;
use crate::engine::item::WorkItem;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

/// Maps `relative_key` to a shard in `[0, num_shards)`.
///
/// SHA-1 of the UTF-8 key, first 8 bytes as a big-endian `u64`, modulo the
/// shard count. Equal to `int.from_bytes(sha1(key).digest()[:8], "big") % n`, so
/// workers written against that formula can share a corpus. A different `num_shards`
/// gives an unrelated partition.
pub fn shard_of(relative_key: &str, num_shards: u32) -> u32 {
    debug_assert!(num_shards > 0);

    let digest = Sha1::digest(relative_key.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);

    (u64::from_be_bytes(prefix) % u64::from(num_shards.max(1))) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardSpec {
    num_shards: u32,
    shard_index: u32,
}

impl ShardSpec {
    pub fn new(num_shards: u32, shard_index: u32) -> Result<Self, EngineError> {
        if num_shards == 0 || shard_index >= num_shards {
            return Err(EngineError::InvalidShardSpec { num_shards, shard_index });
        }
        Ok(Self { num_shards, shard_index })
    }

    pub fn whole() -> Self {
        Self { num_shards: 1, shard_index: 0 }
    }

    pub fn num_shards(&self) -> u32 {
        self.num_shards
    }

    pub fn shard_index(&self) -> u32 {
        self.shard_index
    }

    /// Re-checks the invariant for specs that came in through serde.
    pub fn validate(&self) -> Result<(), EngineError> {
        Self::new(self.num_shards, self.shard_index).map(|_| ())
    }

    pub fn owns(&self, relative_key: &str) -> bool {
        shard_of(relative_key, self.num_shards) == self.shard_index
    }

    pub fn select(&self, items: Vec<WorkItem>) -> Vec<WorkItem> {
        items
            .into_iter()
            .filter(|item| self.owns(item.relative_key()))
            .collect()
    }
}

impl Default for ShardSpec {
    fn default() -> Self {
        Self::whole()
    }
}

impl std::fmt::Display for ShardSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.shard_index, self.num_shards)
    }
}

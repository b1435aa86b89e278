use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::error::StoreError;
use super::traits::{
    BatchesStore, GetBatchSpecMountOpts, GetBatchSpecOpts, ListBatchSpecMountsOpts,
};
use crate::batch_spec::{BatchSpec, BatchSpecMount};

#[derive(Default)]
struct Inner {
    next_spec_id: i64,
    specs: HashMap<String, BatchSpec>,
    /// Insertion-ordered so snapshots are deterministic.
    mounts: Vec<BatchSpecMount>,
}

/// In-process [`BatchesStore`]. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a batch spec and return it with its assigned numeric id.
    pub async fn insert_batch_spec(&self, rand_id: impl Into<String>) -> BatchSpec {
        let mut inner = self.inner.write().await;
        inner.next_spec_id += 1;
        let spec = BatchSpec {
            id: inner.next_spec_id,
            rand_id: rand_id.into(),
        };
        inner.specs.insert(spec.rand_id.clone(), spec.clone());
        spec
    }

    /// Snapshot of every stored mount in insertion order.
    pub async fn mounts(&self) -> Vec<BatchSpecMount> {
        self.inner.read().await.mounts.clone()
    }
}

#[async_trait]
impl BatchesStore for MemoryStore {
    async fn get_batch_spec(&self, opts: GetBatchSpecOpts) -> Result<BatchSpec, StoreError> {
        self.inner
            .read()
            .await
            .specs
            .get(&opts.rand_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("batch spec {}", opts.rand_id)))
    }

    async fn get_batch_spec_mount(
        &self,
        opts: GetBatchSpecMountOpts,
    ) -> Result<BatchSpecMount, StoreError> {
        self.inner
            .read()
            .await
            .mounts
            .iter()
            .find(|m| m.rand_id == opts.rand_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("batch spec mount {}", opts.rand_id)))
    }

    async fn count_batch_spec_mounts(
        &self,
        opts: ListBatchSpecMountsOpts,
    ) -> Result<u64, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.mounts.iter().filter(|m| opts.matches(m)).count() as u64)
    }

    async fn upsert_batch_spec_mount(
        &self,
        mount: &BatchSpecMount,
    ) -> Result<BatchSpecMount, StoreError> {
        let mut inner = self.inner.write().await;

        if !inner.specs.values().any(|s| s.id == mount.batch_spec_id) {
            return Err(StoreError::NotFound(format!(
                "batch spec with id {}",
                mount.batch_spec_id
            )));
        }

        if let Some(existing) = inner.mounts.iter_mut().find(|m| m.same_key(mount)) {
            existing.size = mount.size;
            existing.content = mount.content.clone();
            existing.modified_at = mount.modified_at;
            debug!(rand_id = %existing.rand_id, size = existing.size, "Replaced mount");
            return Ok(existing.clone());
        }

        let mut stored = mount.clone();
        stored.rand_id = Uuid::now_v7().to_string();
        debug!(rand_id = %stored.rand_id, size = stored.size, "Inserted mount");
        inner.mounts.push(stored.clone());
        Ok(stored)
    }
}

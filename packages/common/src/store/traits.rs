use async_trait::async_trait;

use super::error::StoreError;
use crate::batch_spec::{BatchSpec, BatchSpecMount};

/// Lookup options for [`BatchesStore::get_batch_spec`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetBatchSpecOpts {
    pub rand_id: String,
}

/// Lookup options for [`BatchesStore::get_batch_spec_mount`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetBatchSpecMountOpts {
    pub rand_id: String,
}

/// Filter for [`BatchesStore::count_batch_spec_mounts`].
///
/// Every `Some` field must match. An empty filter matches every mount.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListBatchSpecMountsOpts {
    pub rand_id: Option<String>,
    pub batch_spec_id: Option<i64>,
}

impl ListBatchSpecMountsOpts {
    pub fn matches(&self, mount: &BatchSpecMount) -> bool {
        self.rand_id.as_deref().is_none_or(|id| id == mount.rand_id)
            && self
                .batch_spec_id
                .is_none_or(|id| id == mount.batch_spec_id)
    }
}

/// Persistence for batch specs and their mounts.
#[async_trait]
pub trait BatchesStore: Send + Sync {
    /// Resolve a batch spec by its external identifier.
    async fn get_batch_spec(&self, opts: GetBatchSpecOpts) -> Result<BatchSpec, StoreError>;

    /// Fetch a single mount, content included.
    async fn get_batch_spec_mount(
        &self,
        opts: GetBatchSpecMountOpts,
    ) -> Result<BatchSpecMount, StoreError>;

    /// Count the mounts matching `opts`.
    async fn count_batch_spec_mounts(
        &self,
        opts: ListBatchSpecMountsOpts,
    ) -> Result<u64, StoreError>;

    /// Insert or replace a mount keyed by `(batch_spec_id, path, file_name)`.
    ///
    /// Returns the stored mount with its `rand_id` populated. Replacing an
    /// existing mount keeps its `rand_id`.
    async fn upsert_batch_spec_mount(
        &self,
        mount: &BatchSpecMount,
    ) -> Result<BatchSpecMount, StoreError>;
}

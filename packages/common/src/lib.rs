pub mod batch_spec;
pub mod store;
pub mod timestamp;

pub use batch_spec::{BatchSpec, BatchSpecMount};
pub use store::{
    BatchesStore, GetBatchSpecMountOpts, GetBatchSpecOpts, ListBatchSpecMountsOpts, StoreError,
};

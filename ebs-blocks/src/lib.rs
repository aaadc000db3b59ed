#![allow(clippy::uninlined_format_args)]
#![deny(unused_qualifications)]

//! Building blocks for exercising the EBS direct APIs against one snapshot.

pub mod block;
pub mod errors;
pub mod store;
pub mod types;
pub mod writer;

pub use block::{Block, BlockChecksum, BLOCK_DATA_LENGTH, BLOCK_SIZE};
pub use errors::{BlockStoreError, StoreResult};
pub use store::ebs::{EbsClientConfig, EbsSnapshotStore};
pub use store::memory::MemorySnapshotStore;
pub use store::store::{SnapshotStore, SnapshotStores};
pub use types::{BlockListing, PutBlockReceipt, PutBlockRequest, SnapshotRef};
pub use writer::{BlockWriter, DEFAULT_LIST_MAX_RESULTS};

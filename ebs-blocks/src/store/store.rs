use async_trait::async_trait;
use crate::errors::StoreResult;
use crate::store::ebs::EbsSnapshotStore;
use crate::store::memory::MemorySnapshotStore;
use crate::types::{BlockListing, PutBlockReceipt, PutBlockRequest, SnapshotRef};

/// The two EBS direct API calls the writer needs.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Lists up to `max_results` blocks of `snapshot`.
    async fn list_blocks(&self, snapshot: &SnapshotRef, max_results: i32) -> StoreResult<BlockListing>;

    /// Writes one block. The request already carries its checksum.
    async fn put_block(&self, request: PutBlockRequest) -> StoreResult<PutBlockReceipt>;
}


#[derive(Debug, Clone)]
pub enum SnapshotStores {
    Ebs(EbsSnapshotStore),
    Memory(MemorySnapshotStore),
}

impl SnapshotStores {
    /// Returns a reference to the inner value as a trait object.
    pub fn as_trait(&self) -> &dyn SnapshotStore {
        match self {
            SnapshotStores::Ebs(a) => a,
            SnapshotStores::Memory(b) => b,
        }
    }
}

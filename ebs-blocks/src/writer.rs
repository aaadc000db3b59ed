use crate::block::Block;
use crate::errors::StoreResult;
use crate::store::store::SnapshotStore;
use crate::types::{BlockListing, PutBlockReceipt, PutBlockRequest, SnapshotRef};

/// Page size used by the original repro for ListSnapshotBlocks.
pub const DEFAULT_LIST_MAX_RESULTS: i32 = 100;

/// Issues single-attempt EBS direct API calls against one snapshot.
///
/// Failures are returned as values and logged; nothing here retries.
pub struct BlockWriter<'a> {
    snapshot: SnapshotRef,
    store: &'a dyn SnapshotStore,
    list_max_results: i32,
}

impl<'a> BlockWriter<'a> {
    pub fn new(snapshot: SnapshotRef, store: &'a dyn SnapshotStore) -> Self {
        Self { snapshot, store, list_max_results: DEFAULT_LIST_MAX_RESULTS }
    }

    pub fn with_list_max_results(mut self, max_results: i32) -> Self {
        self.list_max_results = max_results;
        self
    }

    pub fn snapshot(&self) -> &SnapshotRef {
        &self.snapshot
    }

    pub async fn list_blocks(&self) -> StoreResult<BlockListing> {
        match self.store.list_blocks(&self.snapshot, self.list_max_results).await {
            Ok(listing) => {
                tracing::info!(
                    snapshot = %self.snapshot,
                    blocks = listing.blocks.len(),
                    has_more = listing.next_token.is_some(),
                    "ListSnapshotBlocks succeeded"
                );
                Ok(listing)
            }
            Err(e) => {
                tracing::error!(snapshot = %self.snapshot, code = e.code(), "ListSnapshotBlocks failed: {}", e.message());
                Err(e)
            }
        }
    }

    /// Writes a zero-filled block at `block_index`.
    pub async fn put_one_block(&self, block_index: i32) -> StoreResult<PutBlockReceipt> {
        let request = PutBlockRequest::for_block(self.snapshot.clone(), Block::zeroed(block_index))?;
        tracing::debug!(
            snapshot = %self.snapshot,
            block_index,
            data_length = request.data_length,
            checksum = %request.checksum,
            "Putting block"
        );

        match self.store.put_block(request).await {
            Ok(receipt) => {
                tracing::info!(snapshot = %self.snapshot, block_index, "PutSnapshotBlock succeeded");
                Ok(receipt)
            }
            Err(e) => {
                tracing::error!(
                    snapshot = %self.snapshot,
                    block_index,
                    code = e.code(),
                    status = ?e.status(),
                    "PutSnapshotBlock failed: {}",
                    e.message()
                );
                Err(e)
            }
        }
    }
}

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use crate::block::{BlockChecksum, BLOCK_DATA_LENGTH, BLOCK_SIZE};
use crate::errors::{BlockStoreError, StoreResult};
use crate::store::store::SnapshotStore;
use crate::types::{BlockDescriptor, BlockListing, PutBlockReceipt, PutBlockRequest, SnapshotRef};

/// A failure the store returns instead of answering, as the service would.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InjectedFailure {
    pub code: String,
    pub message: String,
    pub status: u16,
}

impl InjectedFailure {
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: u16) -> Self {
        Self { code: code.into(), message: message.into(), status }
    }

    fn into_error(self, operation: &'static str) -> BlockStoreError {
        BlockStoreError::Service { operation, code: self.code, message: self.message, status: Some(self.status) }
    }
}

/// A put request as the store saw it, without the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedPut {
    pub snapshot: SnapshotRef,
    pub block_index: i32,
    pub data_length: i32,
    pub payload_len: usize,
    pub checksum: String,
    pub checksum_algorithm: &'static str,
}

#[derive(Debug, Default)]
struct MemoryState {
    /// Written blocks per snapshot, keyed by block index.
    blocks: BTreeMap<String, BTreeMap<i32, Vec<u8>>>,
    puts: Vec<RecordedPut>,
    list_calls: usize,
    fail_puts: Option<InjectedFailure>,
    /// Failures for puts of a single block index, checked after `fail_puts`.
    fail_puts_at: BTreeMap<i32, InjectedFailure>,
    fail_lists: Option<InjectedFailure>,
}

/// An in-process `SnapshotStore` that validates writes the way the service does.
#[derive(Clone, Debug, Default)]
pub struct MemorySnapshotStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide the recorded calls from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every following put fails with `failure` until cleared.
    pub fn fail_puts_with(&self, failure: Option<InjectedFailure>) {
        self.state().fail_puts = failure;
    }

    /// Every following put of `block_index` fails with `failure`; other indices are unaffected.
    pub fn fail_put_at(&self, block_index: i32, failure: InjectedFailure) {
        self.state().fail_puts_at.insert(block_index, failure);
    }

    /// Every following list fails with `failure` until cleared.
    pub fn fail_lists_with(&self, failure: Option<InjectedFailure>) {
        self.state().fail_lists = failure;
    }

    pub fn recorded_puts(&self) -> Vec<RecordedPut> {
        self.state().puts.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.state().list_calls
    }

    pub fn stored_block(&self, snapshot: &SnapshotRef, block_index: i32) -> Option<Vec<u8>> {
        self.state().blocks.get(snapshot.as_str())?.get(&block_index).cloned()
    }
}

fn validation_error(message: String) -> BlockStoreError {
    BlockStoreError::Service {
        operation: "PutSnapshotBlock",
        code: "ValidationException".to_string(),
        message,
        status: Some(400),
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshotStore {
    async fn list_blocks(&self, snapshot: &SnapshotRef, max_results: i32) -> StoreResult<BlockListing> {
        let mut state = self.state();
        state.list_calls += 1;
        if let Some(failure) = state.fail_lists.clone() {
            return Err(failure.into_error("ListSnapshotBlocks"));
        }

        let written = state.blocks.get(snapshot.as_str());
        let total = written.map_or(0, |blocks| blocks.len());
        let limit = usize::try_from(max_results).unwrap_or(0);
        let blocks: Vec<BlockDescriptor> = written
            .into_iter()
            .flat_map(|blocks| blocks.keys())
            .take(limit)
            .map(|index| BlockDescriptor {
                block_index: *index,
                block_token: Some(format!("{}-{}", snapshot, index)),
            })
            .collect();
        let next_token = (total > blocks.len())
            .then(|| blocks.last().map(|b| b.block_index.to_string()))
            .flatten();

        tracing::debug!(snapshot = %snapshot, returned = blocks.len(), "Listed in-memory blocks");
        Ok(BlockListing {
            blocks,
            block_size: Some(BLOCK_DATA_LENGTH),
            volume_size: None,
            next_token,
        })
    }

    async fn put_block(&self, request: PutBlockRequest) -> StoreResult<PutBlockReceipt> {
        let mut state = self.state();
        state.puts.push(RecordedPut {
            snapshot: request.snapshot.clone(),
            block_index: request.block_index,
            data_length: request.data_length,
            payload_len: request.data.len(),
            checksum: request.checksum.to_string(),
            checksum_algorithm: request.checksum_algorithm.as_str(),
        });

        let injected = state.fail_puts.clone()
            .or_else(|| state.fail_puts_at.get(&request.block_index).cloned());
        if let Some(failure) = injected {
            return Err(failure.into_error("PutSnapshotBlock"));
        }
        if request.data.len() != BLOCK_SIZE || request.data_length as usize != request.data.len() {
            return Err(validation_error(format!(
                "Data length {} does not match a {} byte block",
                request.data_length, BLOCK_SIZE
            )));
        }
        if request.checksum != BlockChecksum::compute(&request.data) {
            return Err(validation_error("The checksum does not match the block data".to_string()));
        }

        let receipt = PutBlockReceipt {
            checksum: Some(request.checksum.to_string()),
            checksum_algorithm: Some(request.checksum_algorithm),
        };
        state.blocks
            .entry(request.snapshot.as_str().to_string())
            .or_default()
            .insert(request.block_index, request.data);
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use uuid::Uuid;

    fn random_snapshot() -> SnapshotRef {
        SnapshotRef::new(format!("snap-{}", Uuid::new_v4().simple())).unwrap()
    }

    #[tokio::test]
    async fn test_put_then_list() {
        let store = MemorySnapshotStore::new();
        let snapshot = random_snapshot();

        for index in [2, 0, 1] {
            let request = PutBlockRequest::for_block(snapshot.clone(), Block::zeroed(index)).unwrap();
            store.put_block(request).await.unwrap();
        }

        let listing = store.list_blocks(&snapshot, 100).await.unwrap();
        let indices: Vec<i32> = listing.blocks.iter().map(|b| b.block_index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(listing.next_token, None);
        assert_eq!(store.stored_block(&snapshot, 1).unwrap().len(), BLOCK_SIZE);
    }

    #[tokio::test]
    async fn test_list_is_limited_by_max_results() {
        let store = MemorySnapshotStore::new();
        let snapshot = random_snapshot();
        for index in 0..3 {
            let request = PutBlockRequest::for_block(snapshot.clone(), Block::zeroed(index)).unwrap();
            store.put_block(request).await.unwrap();
        }

        let listing = store.list_blocks(&snapshot, 2).await.unwrap();
        assert_eq!(listing.blocks.len(), 2);
        assert_eq!(listing.next_token.as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_put_rejects_checksum_mismatch() {
        let store = MemorySnapshotStore::new();
        let snapshot = random_snapshot();
        let mut request = PutBlockRequest::for_block(snapshot.clone(), Block::zeroed(0)).unwrap();
        request.data[0] = 0xff;

        let err = store.put_block(request).await.unwrap_err();
        assert_eq!(err.code(), "ValidationException");
        assert_eq!(err.status(), Some(400));
        assert!(store.stored_block(&snapshot, 0).is_none());
        assert_eq!(store.recorded_puts().len(), 1);
    }

    #[tokio::test]
    async fn test_put_rejects_short_payload() {
        let store = MemorySnapshotStore::new();
        let mut request = PutBlockRequest::for_block(random_snapshot(), Block::zeroed(0)).unwrap();
        request.data.truncate(1024);
        request.checksum = BlockChecksum::compute(&request.data);

        let err = store.put_block(request).await.unwrap_err();
        assert_eq!(err.code(), "ValidationException");
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let store = MemorySnapshotStore::new();
        let snapshot = random_snapshot();
        store.fail_puts_with(Some(InjectedFailure::new("InternalServerException", "boom", 500)));
        store.fail_lists_with(Some(InjectedFailure::new("ResourceNotFoundException", "no snapshot", 404)));

        let request = PutBlockRequest::for_block(snapshot.clone(), Block::zeroed(0)).unwrap();
        let err = store.put_block(request).await.unwrap_err();
        assert_eq!(err.code(), "InternalServerException");
        assert_eq!(err.message(), "boom");
        assert_eq!(err.status(), Some(500));

        let err = store.list_blocks(&snapshot, 100).await.unwrap_err();
        assert_eq!(err.code(), "ResourceNotFoundException");
        assert_eq!(store.list_calls(), 1);

        store.fail_puts_with(None);
        let request = PutBlockRequest::for_block(snapshot.clone(), Block::zeroed(0)).unwrap();
        assert!(store.put_block(request).await.is_ok());
    }

    #[tokio::test]
    async fn test_failure_at_single_index() {
        let store = MemorySnapshotStore::new();
        let snapshot = random_snapshot();
        store.fail_put_at(1, InjectedFailure::new("InternalServerException", "boom", 500));

        for index in 0..3 {
            let request = PutBlockRequest::for_block(snapshot.clone(), Block::zeroed(index)).unwrap();
            let result = store.put_block(request).await;
            assert_eq!(result.is_err(), index == 1, "block {}", index);
        }

        assert_eq!(store.recorded_puts().len(), 3);
        assert!(store.stored_block(&snapshot, 1).is_none());
        assert!(store.stored_block(&snapshot, 2).is_some());
    }
}

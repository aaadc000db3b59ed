use std::fmt::{self, Display, Formatter};
use crate::block::{Block, BlockChecksum, BLOCK_DATA_LENGTH};
use crate::errors::BlockStoreError;

/// Identifier of the remote snapshot every call is bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SnapshotRef(String);

impl SnapshotRef {
    pub fn new(id: impl Into<String>) -> Result<Self, BlockStoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(BlockStoreError::InvalidSnapshotId(id));
        }
        Ok(SnapshotRef(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SnapshotRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checksum algorithms accepted by PutSnapshotBlock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksumAlgorithm {
    Sha256,
}

impl ChecksumAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "SHA256",
        }
    }
}

/// Everything a single PutSnapshotBlock call carries.
#[derive(Clone, Debug)]
pub struct PutBlockRequest {
    pub snapshot: SnapshotRef,
    pub block_index: i32,
    pub data_length: i32,
    pub data: Vec<u8>,
    pub checksum: BlockChecksum,
    pub checksum_algorithm: ChecksumAlgorithm,
}

impl PutBlockRequest {
    /// Builds the request for `block`, checksumming the exact bytes that will be sent.
    pub fn for_block(snapshot: SnapshotRef, block: Block) -> Result<Self, BlockStoreError> {
        let block_index = block.index();
        if block_index < 0 {
            return Err(BlockStoreError::InvalidBlockIndex(block_index as i64));
        }
        let checksum = block.checksum();
        Ok(Self {
            snapshot,
            block_index,
            data_length: BLOCK_DATA_LENGTH,
            data: block.into_data(),
            checksum,
            checksum_algorithm: BlockChecksum::ALGORITHM,
        })
    }
}

/// One entry of a ListSnapshotBlocks page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockDescriptor {
    pub block_index: i32,
    pub block_token: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BlockListing {
    pub blocks: Vec<BlockDescriptor>,
    pub block_size: Option<i32>,
    pub volume_size: Option<i64>,
    pub next_token: Option<String>,
}

/// What the service echoes back after accepting a block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PutBlockReceipt {
    pub checksum: Option<String>,
    pub checksum_algorithm: Option<ChecksumAlgorithm>,
}

use std::fmt::{self, Display, Formatter};
use sha2::{Digest, Sha256};
use crate::types::ChecksumAlgorithm;

/// Size of a single EBS snapshot block. PutSnapshotBlock only accepts this size.
pub const BLOCK_SIZE: usize = 512 * 1024;

/// `BLOCK_SIZE` as the DataLength field of a put request.
pub const BLOCK_DATA_LENGTH: i32 = BLOCK_SIZE as i32;

/// A block payload addressed by its zero-based index within a snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Block {
    index: i32,
    data: Vec<u8>,
}

impl Block {
    /// Creates a `BLOCK_SIZE` block filled with zeroes.
    pub fn zeroed(index: i32) -> Self {
        Self { index, data: vec![0u8; BLOCK_SIZE] }
    }

    pub fn index(&self) -> i32 {
        self.index
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn checksum(&self) -> BlockChecksum {
        BlockChecksum::compute(&self.data)
    }

    /// Consumes the block, handing back the payload for the request body.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Base64-encoded SHA-256 digest of a block's bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockChecksum(String);

impl BlockChecksum {
    pub const ALGORITHM: ChecksumAlgorithm = ChecksumAlgorithm::Sha256;

    pub fn compute(data: &[u8]) -> Self {
        let digest = Sha256::digest(data);
        BlockChecksum(aws_smithy_types::base64::encode(&digest[..]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for BlockChecksum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<BlockChecksum> for String {
    fn from(checksum: BlockChecksum) -> Self {
        checksum.0
    }
}

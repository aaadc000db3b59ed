use std::io;
use ebs_blocks::BlockStoreError;
use thiserror::Error;


#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] clap::Error),

    #[error("Invalid arguments: {0}")]
    Snapshot(#[from] BlockStoreError),

    #[error("Invalid arguments: {count} blocks from index {start} run past the last block index")]
    BlockRange { start: i32, count: u32 },

    #[error("Failed to write report")]
    Output(#[from] io::Error),
}

use std::io::{self, Write};
use std::process::ExitCode;
use ebs_blocks::{BlockStoreError, BlockWriter, SnapshotRef, SnapshotStore};
use crate::params::RunConfig;

/// What happened to the writes of one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub attempted: u32,
    pub failed: u32,
    pub last_failed: bool,
}

impl RunSummary {
    pub fn succeeded(&self) -> bool {
        !self.last_failed
    }

    /// The run fails exactly when its last write did.
    pub fn exit_code(&self) -> ExitCode {
        if self.succeeded() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        }
    }
}

fn report_list_failure<W: Write>(out: &mut W, snapshot: &SnapshotRef, err: &BlockStoreError) -> io::Result<()> {
    writeln!(out, "Error: ListSnapshotBlocks: {} {}: {}", snapshot, err.code(), err.message())
}

fn report_put_failure<W: Write>(out: &mut W, snapshot: &SnapshotRef, block_index: i32, err: &BlockStoreError) -> io::Result<()> {
    writeln!(
        out,
        "Failed to put block {}. Snapshot {}. Exception - {}: {}",
        block_index,
        snapshot,
        err.code(),
        err.message()
    )?;
    if let Some(status) = err.status() {
        writeln!(out, "Error code {}", status)?;
    }
    Ok(())
}

async fn list_and_report<W: Write>(writer: &BlockWriter<'_>, out: &mut W) -> io::Result<()> {
    match writer.list_blocks().await {
        Ok(_) => writeln!(out, "ListSnapshotBlocks for snapshot {} is successful", writer.snapshot()),
        Err(e) => report_list_failure(out, writer.snapshot(), &e),
    }
}

/// Runs the configured calls one after another, printing each outcome to `out`.
pub async fn run<W: Write>(config: &RunConfig, store: &dyn SnapshotStore, out: &mut W) -> io::Result<RunSummary> {
    let writer = BlockWriter::new(config.snapshot.clone(), store)
        .with_list_max_results(config.list_max_results);
    let mut summary = RunSummary::default();

    if config.list {
        list_and_report(&writer, out).await?;
    }

    for block_index in config.block_indices.clone() {
        summary.attempted += 1;
        match writer.put_one_block(block_index).await {
            Ok(_) => {
                summary.last_failed = false;
                writeln!(out, "Wrote block {}", block_index)?;
            }
            Err(e) => {
                summary.failed += 1;
                summary.last_failed = true;
                report_put_failure(out, writer.snapshot(), block_index, &e)?;
                if config.list {
                    // See whether the snapshot still answers after the failed write
                    list_and_report(&writer, out).await?;
                }
            }
        }
    }

    tracing::info!(
        snapshot = %config.snapshot,
        attempted = summary.attempted,
        failed = summary.failed,
        "Run finished"
    );
    Ok(summary)
}

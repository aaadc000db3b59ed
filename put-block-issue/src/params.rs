use std::ffi::OsString;
use std::ops::Range;
use std::time::Duration;
use clap::builder::NonEmptyStringValueParser;
use clap::Parser;
use ebs_blocks::{EbsClientConfig, SnapshotRef, DEFAULT_LIST_MAX_RESULTS};
use crate::errors::CliError;

/// Reproduces EBS direct API errors by writing zero blocks to a snapshot.
#[derive(Parser, Debug)]
#[command(name = "put-block-issue")]
pub struct Args {
    /// EBS snapshot ID to write to
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub(crate) snapshot: String,

    /// Call ListSnapshotBlocks before writing and again after every failed write
    #[arg(short, long)]
    pub(crate) list: bool,

    /// Number of consecutive blocks to write
    #[arg(short = 'n', long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) blocks: u32,

    /// Index of the first block to write
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(i32).range(0..))]
    pub(crate) start_index: i32,

    /// MaxResults for ListSnapshotBlocks
    #[arg(long, default_value_t = DEFAULT_LIST_MAX_RESULTS, value_parser = clap::value_parser!(i32).range(100..=10000))]
    pub(crate) list_max_results: i32,

    #[arg(long, env = "AWS_REGION")]
    pub(crate) region: Option<String>,

    #[arg(long, env = "EBS_ENDPOINT_URL")]
    pub(crate) endpoint_url: Option<String>,

    #[arg(long, default_value_t = 30_000)]
    pub(crate) connect_timeout_ms: u64,

    #[arg(long, default_value_t = 600_000)]
    pub(crate) request_timeout_ms: u64,

    /// Attempts the SDK makes per call, 1 disables its retries
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) max_attempts: u32,

    /// Write to an in-memory store instead of AWS
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Log the AWS SDK at trace level
    #[arg(long)]
    pub(crate) sdk_trace: bool,
}

/// Validated settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub snapshot: SnapshotRef,
    pub list: bool,
    pub block_indices: Range<i32>,
    pub list_max_results: i32,
    pub dry_run: bool,
    pub sdk_trace: bool,
    pub client: EbsClientConfig,
}

impl TryFrom<Args> for RunConfig {
    type Error = CliError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let snapshot = SnapshotRef::new(args.snapshot)?;
        let count = i32::try_from(args.blocks).ok();
        let end = count
            .and_then(|count| args.start_index.checked_add(count))
            .ok_or(CliError::BlockRange { start: args.start_index, count: args.blocks })?;

        Ok(Self {
            snapshot,
            list: args.list,
            block_indices: args.start_index..end,
            list_max_results: args.list_max_results,
            dry_run: args.dry_run,
            sdk_trace: args.sdk_trace,
            client: EbsClientConfig {
                region: args.region,
                endpoint_url: args.endpoint_url,
                connect_timeout: Duration::from_millis(args.connect_timeout_ms),
                request_timeout: Duration::from_millis(args.request_timeout_ms),
                max_attempts: args.max_attempts,
            },
        })
    }
}

pub fn parse_config<I, T>(argv: I) -> Result<RunConfig, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = Args::try_parse_from(argv)?;
    RunConfig::try_from(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_snapshot_only() {
        let config = parse_config(["put-block-issue", "--snapshot", "snap-0001"]).unwrap();
        assert_eq!(config.snapshot.as_str(), "snap-0001");
        assert!(!config.list);
        assert_eq!(config.block_indices, 0..1);
        assert_eq!(config.list_max_results, 100);
        assert!(!config.dry_run);
        assert_eq!(config.client.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.client.request_timeout, Duration::from_secs(600));
        assert_eq!(config.client.max_attempts, 1);
    }

    #[test]
    fn test_short_flags() {
        let config = parse_config(["put-block-issue", "-s", "snap-0002", "-l", "-n", "210"]).unwrap();
        assert_eq!(config.snapshot.as_str(), "snap-0002");
        assert!(config.list);
        assert_eq!(config.block_indices, 0..210);
    }

    #[test]
    fn test_missing_snapshot_is_rejected() {
        match parse_config(["put-block-issue"]) {
            Err(CliError::Args(e)) => assert_eq!(e.kind(), ErrorKind::MissingRequiredArgument),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_empty_snapshot_is_rejected() {
        assert!(matches!(parse_config(["put-block-issue", "--snapshot", ""]), Err(CliError::Args(_))));
        assert!(matches!(parse_config(["put-block-issue", "--snapshot", "  "]), Err(CliError::Snapshot(_))));
    }

    #[test]
    fn test_help_is_an_error() {
        match parse_config(["put-block-issue", "--help"]) {
            Err(CliError::Args(e)) => {
                assert_eq!(e.kind(), ErrorKind::DisplayHelp);
                assert!(e.to_string().contains("--snapshot"));
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_unknown_flag_is_rejected() {
        assert!(matches!(
            parse_config(["put-block-issue", "--snapshot", "snap-0001", "--bogus"]),
            Err(CliError::Args(_))
        ));
    }

    #[test]
    fn test_block_range_overflow_is_rejected() {
        let start = i32::MAX.to_string();
        let result = parse_config(["put-block-issue", "-s", "snap-0001", "--start-index", start.as_str(), "-n", "2"]);
        assert!(matches!(result, Err(CliError::BlockRange { count: 2, .. })));
    }

    #[test]
    fn test_list_max_results_bounds() {
        assert!(parse_config(["put-block-issue", "-s", "snap-0001", "--list-max-results", "99"]).is_err());
        let config = parse_config(["put-block-issue", "-s", "snap-0001", "--list-max-results", "10000"]).unwrap();
        assert_eq!(config.list_max_results, 10000);
    }
}

use std::time::Duration;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::RetryConfig;
use aws_config::timeout::TimeoutConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ebs::config::http::HttpResponse;
use aws_sdk_ebs::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_ebs::primitives::ByteStream;
use aws_sdk_ebs::types::ChecksumAlgorithm as EbsChecksumAlgorithm;
use aws_sdk_ebs::Client as EbsClient;
use crate::errors::{BlockStoreError, StoreResult};
use crate::store::store::SnapshotStore;
use crate::types::{BlockDescriptor, BlockListing, ChecksumAlgorithm, PutBlockReceipt, PutBlockRequest, SnapshotRef};

const LIST_SNAPSHOT_BLOCKS: &str = "ListSnapshotBlocks";
const PUT_SNAPSHOT_BLOCK: &str = "PutSnapshotBlock";

/// Knobs for the SDK client. Everything else comes from the default provider chains.
#[derive(Clone, Debug)]
pub struct EbsClientConfig {
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_attempts: u32,
}

impl Default for EbsClientConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            connect_timeout: Duration::from_millis(30_000),
            request_timeout: Duration::from_millis(600_000),
            max_attempts: 1,
        }
    }
}

/// Creates an EBS client from the environment, applying the overrides in `config`.
pub async fn create_ebs_client(config: &EbsClientConfig) -> EbsClient {
    // Explicit region first, then the usual chain, then a fixed fallback
    let region_provider = RegionProviderChain::first_try(config.region.clone().map(Region::new))
        .or_default_provider()
        .or_else("us-east-1");

    let timeouts = TimeoutConfig::builder()
        .connect_timeout(config.connect_timeout)
        .operation_attempt_timeout(config.request_timeout)
        .build();

    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(region_provider)
        .timeout_config(timeouts)
        .retry_config(RetryConfig::standard().with_max_attempts(config.max_attempts.max(1)));

    if let Some(endpoint_url) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint_url.clone());
    }

    let sdk_config = loader.load().await;
    tracing::debug!(region = ?sdk_config.region(), endpoint = ?config.endpoint_url, "Loaded EBS client configuration");
    EbsClient::new(&sdk_config)
}

/// A `SnapshotStore` backed by the EBS direct APIs.
#[derive(Clone, Debug)]
pub struct EbsSnapshotStore {
    client: EbsClient,
}

impl EbsSnapshotStore {
    pub fn new(client: EbsClient) -> Self {
        Self { client }
    }

    pub async fn from_config(config: &EbsClientConfig) -> Self {
        Self::new(create_ebs_client(config).await)
    }
}

fn map_sdk_error<E>(operation: &'static str, err: SdkError<E, HttpResponse>) -> BlockStoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(_) => BlockStoreError::Service {
            operation,
            code: err.code().unwrap_or("Unknown").to_string(),
            message: err.message().unwrap_or_default().to_string(),
            status: err.raw_response().map(|resp| resp.status().as_u16()),
        },
        _ => BlockStoreError::Transport {
            operation,
            reason: DisplayErrorContext(&err).to_string(),
        },
    }
}

fn to_ebs_algorithm(algorithm: ChecksumAlgorithm) -> EbsChecksumAlgorithm {
    match algorithm {
        ChecksumAlgorithm::Sha256 => EbsChecksumAlgorithm::ChecksumAlgorithmSha256,
    }
}

fn from_ebs_algorithm(algorithm: &EbsChecksumAlgorithm) -> Option<ChecksumAlgorithm> {
    match algorithm {
        EbsChecksumAlgorithm::ChecksumAlgorithmSha256 => Some(ChecksumAlgorithm::Sha256),
        _ => None,
    }
}

#[async_trait]
impl SnapshotStore for EbsSnapshotStore {
    async fn list_blocks(&self, snapshot: &SnapshotRef, max_results: i32) -> StoreResult<BlockListing> {
        let resp = self.client
            .list_snapshot_blocks()
            .snapshot_id(snapshot.as_str())
            .max_results(max_results)
            .send()
            .await
            .map_err(|e| map_sdk_error(LIST_SNAPSHOT_BLOCKS, e))?;

        let blocks = resp.blocks()
            .iter()
            .filter_map(|block| {
                block.block_index().map(|block_index| BlockDescriptor {
                    block_index,
                    block_token: block.block_token().map(str::to_string),
                })
            })
            .collect();

        Ok(BlockListing {
            blocks,
            block_size: resp.block_size(),
            volume_size: resp.volume_size(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn put_block(&self, request: PutBlockRequest) -> StoreResult<PutBlockReceipt> {
        let PutBlockRequest { snapshot, block_index, data_length, data, checksum, checksum_algorithm } = request;

        let resp = self.client
            .put_snapshot_block()
            .snapshot_id(snapshot.as_str())
            .block_index(block_index)
            .block_data(ByteStream::from(data))
            .data_length(data_length)
            .checksum(String::from(checksum))
            .checksum_algorithm(to_ebs_algorithm(checksum_algorithm))
            .send()
            .await
            .map_err(|e| map_sdk_error(PUT_SNAPSHOT_BLOCK, e))?;

        Ok(PutBlockReceipt {
            checksum: resp.checksum().map(str::to_string),
            checksum_algorithm: resp.checksum_algorithm().and_then(from_ebs_algorithm),
        })
    }
}

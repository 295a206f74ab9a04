//! S3-compatible object storage for submission pictures
//!
//! Uploads stream the image through a counting reader so callers get live
//! progress while the SDK consumes the body.

use std::io::{self, Cursor};
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, Region};
use tokio::io::{AsyncRead, ReadBuf};
use tracing::{debug, info};

use crate::core::config::StorageConfig;
use crate::core::error::{AppError, Result};

/// Bytes sent so far out of the whole body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgress {
    pub loaded: u64,
    pub total: u64,
}

impl UploadProgress {
    /// `floor(loaded * 100 / total)`, capped at 100
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        (self.loaded.saturating_mul(100) / self.total).min(100) as u8
    }
}

/// Progress callback invoked from inside the upload
pub type ProgressFn<'a> = &'a (dyn Fn(UploadProgress) + Send + Sync);

/// Where submission pictures are uploaded to
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<()>;
}

/// S3 (or MinIO) bucket client
pub struct S3ObjectStore {
    bucket: Box<Bucket>,
}

impl S3ObjectStore {
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Config(format!("Failed to create storage credentials: {}", e)))?;

        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse::<Region>().map_err(|e| {
                AppError::Config(format!("Invalid storage region '{}': {}", config.region, e))
            })?,
        };

        let mut bucket = Bucket::new(&config.bucket, region, credentials)
            .map_err(|e| AppError::Config(format!("Failed to create bucket handle: {}", e)))?;

        // Custom endpoints (MinIO, localstack) only speak path-style URLs
        if config.endpoint.is_some() {
            bucket.set_path_style();
        }

        info!("Object store initialized for bucket: {}", bucket.name());

        Ok(Self { bucket })
    }

    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
        on_progress: ProgressFn<'_>,
    ) -> Result<()> {
        let total = data.len() as u64;
        on_progress(UploadProgress { loaded: 0, total });

        let mut reader = ProgressReader::new(Cursor::new(data), total, on_progress);

        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await
            .map_err(|e| AppError::UploadFailure(format!("Failed to upload '{}': {}", key, e)))?;

        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(AppError::UploadFailure(format!(
                "Failed to upload '{}': storage returned HTTP {}",
                key, status
            )));
        }

        on_progress(UploadProgress {
            loaded: total,
            total,
        });

        debug!("Uploaded '{}' ({} bytes) to bucket '{}'", key, total, self.bucket.name());
        Ok(())
    }
}

/// Reader that reports how much of the body has been consumed
struct ProgressReader<'a, R> {
    inner: R,
    loaded: u64,
    total: u64,
    on_progress: ProgressFn<'a>,
}

impl<'a, R> ProgressReader<'a, R> {
    fn new(inner: R, total: u64, on_progress: ProgressFn<'a>) -> Self {
        Self {
            inner,
            loaded: 0,
            total,
            on_progress,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for ProgressReader<'_, R> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);

        if let Poll::Ready(Ok(())) = &poll {
            let read = (buf.filled().len() - before) as u64;
            if read > 0 {
                this.loaded = (this.loaded + read).min(this.total);
                (this.on_progress)(UploadProgress {
                    loaded: this.loaded,
                    total: this.total,
                });
            }
        }

        poll
    }
}

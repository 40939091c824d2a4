use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use bytes::Bytes;
use chrono::NaiveDateTime;
use tracing::{error, info};

use crate::config::Config;
use crate::errors::AppError;

const KEY_ROOT: &str = "tailored_applications";

static_regex!(unsafe_key_char, r"[^\w\-.]");

/// `tailored_applications/{company}/{YYYY-MM-DD}/{HHMMSSffffff}_{file}`.
pub fn object_key(company: &str, file_name: &str, at: NaiveDateTime) -> String {
    let company = match company.trim() {
        "" => "UnknownCompany".to_string(),
        c => unsafe_key_char().replace_all(c, "_").into_owned(),
    };
    format!(
        "{KEY_ROOT}/{company}/{}/{}_{file_name}",
        at.format("%Y-%m-%d"),
        at.format("%H%M%S%6f")
    )
}

/// Where finished application PDFs are archived.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Uploads `local` under `key` and returns the object URI.
    async fn upload(&self, local: &Path, key: &str) -> Result<String, AppError>;
}

/// Constructs an S3 client for AWS, or for MinIO when an endpoint is configured.
pub async fn build_s3_client(config: &Config) -> S3Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));
    if let Some(endpoint) = &config.s3_endpoint {
        loader = loader.endpoint_url(endpoint);
    }
    let sdk_config = loader.load().await;

    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.s3_endpoint.is_some())
        .build();
    S3Client::from_conf(s3_config)
}

pub struct S3ArtifactStore {
    client: S3Client,
    bucket: String,
}

impl S3ArtifactStore {
    pub fn new(client: S3Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactStore for S3ArtifactStore {
    async fn upload(&self, local: &Path, key: &str) -> Result<String, AppError> {
        if !local.exists() {
            return Err(AppError::NotFound(format!(
                "Local file not found for upload: {}",
                local.display()
            )));
        }
        let data = tokio::fs::read(local).await?;
        let content_type = match local.extension().and_then(|e| e.to_str()) {
            Some("pdf") => "application/pdf",
            Some("docx") => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            _ => "application/octet-stream",
        };

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(Bytes::from(data)))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, key, "Failed to upload file to S3");
                AppError::Storage(format!("Upload of {key} failed: {e}"))
            })?;

        info!(key, bucket = %self.bucket, "File uploaded");
        Ok(format!("s3://{}/{key}", self.bucket))
    }
}

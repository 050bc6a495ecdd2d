//! S3 Storage - S3 兼容对象存储（MinIO 等）
//!
//! 实现 ObjectStoragePort trait，path-style 访问，静态凭证

use async_trait::async_trait;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Builder, Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::application::ports::{ObjectStoragePort, StorageError};

/// S3 存储配置
#[derive(Debug, Clone)]
pub struct S3StorageConfig {
    /// 带协议的服务地址
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// 对外 URL 前缀，不含 bucket
    pub public_base_url: String,
}

/// 拼接对象的公开 URL：`{base}/{bucket}/{key}`
pub fn object_url(base_url: &str, bucket: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        bucket,
        key.trim_start_matches('/')
    )
}

/// S3 兼容对象存储
pub struct S3ObjectStorage {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3ObjectStorage {
    /// 创建客户端，进程启动时调用一次
    pub fn new(config: S3StorageConfig) -> Result<Self, StorageError> {
        if config.bucket.trim().is_empty() {
            return Err(StorageError::Configuration(
                "bucket cannot be empty".to_string(),
            ));
        }
        if config.endpoint.trim().is_empty() {
            return Err(StorageError::Configuration(
                "endpoint cannot be empty".to_string(),
            ));
        }

        let credentials = Credentials::new(
            config.access_key.clone(),
            config.secret_key.clone(),
            None,
            None,
            "narrate-static",
        );

        // 失败直接上报，流水线不做重试
        let s3_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .retry_config(RetryConfig::disabled())
            .endpoint_url(config.endpoint.clone())
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        tracing::info!(
            endpoint = %config.endpoint,
            bucket = %config.bucket,
            "S3 object storage initialized"
        );

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket,
            public_base_url: config.public_base_url,
        })
    }
}

#[async_trait]
impl ObjectStoragePort for S3ObjectStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed {
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;

        Ok(object_url(&self.public_base_url, &self.bucket, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::DeleteFailed {
                key: key.to_string(),
                message: aws_sdk_s3::error::DisplayErrorContext(&e).to_string(),
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::test_support::{CannedResponse, TestServer};

    fn config() -> S3StorageConfig {
        S3StorageConfig {
            endpoint: "http://minio:9000".to_string(),
            access_key: "minio".to_string(),
            secret_key: "minio123".to_string(),
            bucket: "media".to_string(),
            region: "us-east-1".to_string(),
            public_base_url: "https://cdn.example.com".to_string(),
        }
    }

    #[test]
    fn test_object_url() {
        assert_eq!(
            object_url("http://minio:9000/", "media", "audio/a.mp3"),
            "http://minio:9000/media/audio/a.mp3"
        );
    }

    #[test]
    fn test_new_rejects_empty_bucket() {
        let mut config = config();
        config.bucket = String::new();
        assert!(matches!(
            S3ObjectStorage::new(config),
            Err(StorageError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_upload_error() {
        let mut config = config();
        config.endpoint = "http://127.0.0.1:1".to_string();
        let storage = S3ObjectStorage::new(config).unwrap();

        let result = storage
            .upload("audio/a.mp3", b"data".to_vec(), "audio/mpeg")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed { .. })));
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let server = TestServer::start(|_| CannedResponse::status(500)).await;
        let mut config = config();
        config.endpoint = server.base_url.clone();
        let storage = S3ObjectStorage::new(config).unwrap();

        let result = storage
            .upload("audio/a.mp3", b"data".to_vec(), "audio/mpeg")
            .await;
        assert!(matches!(result, Err(StorageError::UploadFailed { .. })));
        assert_eq!(server.hits(), 1);

        assert!(matches!(
            storage.delete("audio/a.mp3").await,
            Err(StorageError::DeleteFailed { .. })
        ));
        assert_eq!(server.hits(), 2);
    }
}

//! Object Storage Port - 出站端口
//!
//! 产物上传到 S3 兼容的对象存储

use async_trait::async_trait;
use thiserror::Error;

/// 对象存储错误
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed for {key}: {message}")]
    UploadFailed { key: String, message: String },

    #[error("Delete failed for {key}: {message}")]
    DeleteFailed { key: String, message: String },

    #[error("Storage configuration error: {0}")]
    Configuration(String),
}

/// Object Storage Port
#[async_trait]
pub trait ObjectStoragePort: Send + Sync {
    /// 上传字节到 `key`，返回可访问的 URL
    ///
    /// 单次 PUT，不重试。已存在的 key 会被覆盖。
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;

    /// 删除 `key`（用于失败回滚）
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

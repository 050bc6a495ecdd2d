//! Memory Storage - 进程内对象存储
//!
//! 用于本地调试和测试，URL 形式与 S3 存储一致

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::s3_storage::object_url;
use crate::application::ports::{ObjectStoragePort, StorageError};

#[derive(Debug, Clone)]
struct StoredObject {
    data: Vec<u8>,
    content_type: String,
}

/// 内存对象存储
pub struct MemoryObjectStorage {
    base_url: String,
    bucket: String,
    objects: RwLock<HashMap<String, StoredObject>>,
}

impl MemoryObjectStorage {
    pub fn new(base_url: impl Into<String>, bucket: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// 读取对象内容
    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(key).map(|o| o.data.clone()))
    }

    /// 读取对象的 Content-Type
    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .read()
            .ok()
            .and_then(|objects| objects.get(key).map(|o| o.content_type.clone()))
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|o| o.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStoragePort for MemoryObjectStorage {
    async fn upload(
        &self,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let mut objects = self.objects.write().map_err(|e| StorageError::UploadFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        objects.insert(
            key.to_string(),
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(object_url(&self.base_url, &self.bucket, key))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut objects = self.objects.write().map_err(|e| StorageError::DeleteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        objects.remove(key);
        Ok(())
    }
}

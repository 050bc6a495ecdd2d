//! Storage Adapter - 对象存储实现

mod memory_storage;
mod s3_storage;

pub use memory_storage::MemoryObjectStorage;
pub use s3_storage::{object_url, S3ObjectStorage, S3StorageConfig};

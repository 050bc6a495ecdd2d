//! Video Compositor Port - 视频合成抽象
//!
//! 背景视频循环 + 字幕烧录 + 音频混流，以及缩略图提取

use async_trait::async_trait;
use thiserror::Error;

/// 合成错误
#[derive(Debug, Error)]
pub enum CompositorError {
    #[error("Failed to fetch {url}: {message}")]
    UpstreamFetch { url: String, message: String },

    #[error("Probe failed: {0}")]
    ProbeFailed(String),

    /// 编码器非零退出，携带 stderr 诊断输出
    #[error("FFmpeg error: {stderr}")]
    EncoderFailed { stderr: String },

    #[error("{step} timed out after {secs}s")]
    Timeout { step: &'static str, secs: u64 },

    #[error("IO error: {0}")]
    IoError(String),
}

/// 合成请求
#[derive(Debug, Clone)]
pub struct CompositeRequest {
    pub audio_url: String,
    pub subtitle_url: String,
    pub background_video_url: String,
}

/// Video Compositor Port
#[async_trait]
pub trait VideoCompositorPort: Send + Sync {
    /// 合成 MP4，时长以音频时长为准
    async fn composite(&self, request: &CompositeRequest) -> Result<Vec<u8>, CompositorError>;

    /// 从视频第 1 秒提取一帧 JPEG
    async fn extract_thumbnail(&self, video_url: &str) -> Result<Vec<u8>, CompositorError>;
}

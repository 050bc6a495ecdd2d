//! Transcriber Port - 语音识别抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::WordTiming;

#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("Failed to fetch audio: {0}")]
    FetchError(String),

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Transcriber Port
///
/// 对远程音频做逐词时间戳识别
#[async_trait]
pub trait TranscriberPort: Send + Sync {
    /// 识别 `audio_url` 指向的音频，返回按时间排序的单词
    async fn transcribe(&self, audio_url: &str) -> Result<Vec<WordTiming>, TranscribeError>;
}

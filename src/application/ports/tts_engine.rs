//! TTS Engine Port - TTS 推理引擎抽象
//!
//! 定义 TTS 推理的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SegmentAudio;

/// TTS 错误
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// 单个句段的合成请求
#[derive(Debug, Clone)]
pub struct SpeechRequest {
    /// 要合成的文本（已去除首尾空白的单个句段）
    pub text: String,
    /// 音色 ID，如 `af_bella`
    pub voice: String,
    /// 语速倍率，必须大于 0
    pub speed: f32,
}

/// TTS Engine Port
///
/// 进程启动时创建一次，所有请求共享
#[async_trait]
pub trait TtsEnginePort: Send + Sync {
    /// 合成一个句段，返回 f32 PCM 样本和采样率
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SegmentAudio, TtsError>;
}

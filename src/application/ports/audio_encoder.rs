//! Audio Encoder Port - 音频编码抽象
//!
//! 将合成得到的 PCM 样本编码为压缩音频（MP3）

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::SynthesizedAudio;

/// 编码错误
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("IO error: {0}")]
    IoError(String),
}

/// Audio Encoder Port
#[async_trait]
pub trait AudioEncoderPort: Send + Sync {
    /// 编码为 MP3
    async fn encode_mp3(&self, audio: &SynthesizedAudio) -> Result<Vec<u8>, EncodeError>;
}

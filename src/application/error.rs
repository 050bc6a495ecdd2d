//! 应用层错误定义
//!
//! 统一的流水线错误类型

use thiserror::Error;

use crate::application::ports::{CompositorError, EncodeError, StorageError, TtsError};
use crate::domain::{ArtifactError, SpeechError, TransitionError};

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// TTS 合成失败
    #[error("Synthesis error: {0}")]
    SynthesisError(String),

    /// 远程资源下载失败
    #[error("Upstream fetch error: {0}")]
    UpstreamFetchError(String),

    /// 编码器失败（音频编码或视频合成）
    #[error("{0}")]
    EncodingError(String),

    /// 存储错误
    #[error("Storage error: {0}")]
    StorageError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<TtsError> for ApplicationError {
    fn from(err: TtsError) -> Self {
        Self::SynthesisError(err.to_string())
    }
}

impl From<SpeechError> for ApplicationError {
    fn from(err: SpeechError) -> Self {
        Self::SynthesisError(err.to_string())
    }
}

impl From<EncodeError> for ApplicationError {
    fn from(err: EncodeError) -> Self {
        Self::EncodingError(err.to_string())
    }
}

impl From<StorageError> for ApplicationError {
    fn from(err: StorageError) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl From<CompositorError> for ApplicationError {
    fn from(err: CompositorError) -> Self {
        match err {
            CompositorError::UpstreamFetch { .. } => Self::UpstreamFetchError(err.to_string()),
            _ => Self::EncodingError(err.to_string()),
        }
    }
}

impl From<ArtifactError> for ApplicationError {
    fn from(err: ArtifactError) -> Self {
        match err {
            ArtifactError::InvalidId(msg) => Self::ValidationError(msg),
            other => Self::InternalError(other.to_string()),
        }
    }
}

impl From<TransitionError> for ApplicationError {
    fn from(err: TransitionError) -> Self {
        Self::InternalError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_failure_keeps_stderr_text() {
        let err: ApplicationError = CompositorError::EncoderFailed {
            stderr: "Invalid data found when processing input".to_string(),
        }
        .into();
        assert!(matches!(err, ApplicationError::EncodingError(_)));
        assert!(err
            .to_string()
            .contains("Invalid data found when processing input"));
    }

    #[test]
    fn test_upstream_fetch_is_distinct() {
        let err: ApplicationError = CompositorError::UpstreamFetch {
            url: "http://x/a.ass".to_string(),
            message: "HTTP 404".to_string(),
        }
        .into();
        assert!(matches!(err, ApplicationError::UpstreamFetchError(_)));
    }
}

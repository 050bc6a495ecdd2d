//! Fake TTS Client - 用于本地调试的 TTS 客户端
//!
//! 不调用 TTS 服务，按文本长度返回静音

use async_trait::async_trait;

use crate::application::ports::{SpeechRequest, TtsEnginePort, TtsError};
use crate::domain::SegmentAudio;

/// Fake TTS Client 配置
#[derive(Debug, Clone)]
pub struct FakeTtsClientConfig {
    /// 采样率
    pub sample_rate: u32,
    /// 每个字符对应的时长（毫秒）
    pub ms_per_char: u32,
}

impl Default for FakeTtsClientConfig {
    fn default() -> Self {
        Self {
            sample_rate: 24000,
            ms_per_char: 60,
        }
    }
}

/// Fake TTS Client
///
/// 时长与语速成反比，结果是确定的
pub struct FakeTtsClient {
    config: FakeTtsClientConfig,
}

impl FakeTtsClient {
    pub fn new(config: FakeTtsClientConfig) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            ms_per_char = config.ms_per_char,
            "FakeTtsClient initialized"
        );
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeTtsClientConfig::default())
    }

    fn sample_count(&self, request: &SpeechRequest) -> usize {
        let chars = request.text.chars().count() as f64;
        let secs = chars * self.config.ms_per_char as f64 / 1000.0 / request.speed as f64;
        (secs * self.config.sample_rate as f64).round() as usize
    }
}

#[async_trait]
impl TtsEnginePort for FakeTtsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SegmentAudio, TtsError> {
        if !(request.speed.is_finite() && request.speed > 0.0) {
            return Err(TtsError::ServiceError(format!(
                "invalid speed {}",
                request.speed
            )));
        }

        tracing::debug!(
            text_len = request.text.len(),
            voice = %request.voice,
            "FakeTtsClient: returning silence"
        );

        Ok(SegmentAudio {
            samples: vec![0.0; self.sample_count(request)],
            sample_rate: self.config.sample_rate,
        })
    }
}

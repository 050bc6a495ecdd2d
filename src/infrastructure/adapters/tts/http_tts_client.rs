//! HTTP TTS Client - 调用外部 TTS HTTP 服务
//!
//! 实现 TtsEnginePort trait，通过 HTTP 调用外部 TTS 服务（Kokoro-FastAPI 等
//! OpenAI 兼容接口）
//!
//! 外部 TTS API:
//! POST {base_url}/v1/audio/speech
//! Request: {"model": "kokoro", "input": "...", "voice": "af_bella", "speed": 1.0, "response_format": "wav"}
//! Response: audio/wav binary

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

use crate::application::ports::{SpeechRequest, TtsEnginePort, TtsError};
use crate::domain::SegmentAudio;
use crate::infrastructure::adapters::audio::decode_wav;

/// TTS 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SpeechHttpRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'static str,
}

/// HTTP TTS 客户端配置
#[derive(Debug, Clone)]
pub struct HttpTtsClientConfig {
    /// TTS 服务基础 URL
    pub base_url: String,
    /// 模型名
    pub model: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpTtsClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8880".to_string(),
            model: "kokoro".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpTtsClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP TTS 客户端
///
/// 通过 HTTP 调用外部 TTS 服务
pub struct HttpTtsClient {
    client: Client,
    config: HttpTtsClientConfig,
}

impl HttpTtsClient {
    /// 创建新的 HTTP TTS 客户端
    pub fn new(config: HttpTtsClientConfig) -> Result<Self, TtsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TtsError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// 获取合成 URL
    fn speech_url(&self) -> String {
        format!("{}/v1/audio/speech", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl TtsEnginePort for HttpTtsClient {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<SegmentAudio, TtsError> {
        let http_request = SpeechHttpRequest {
            model: &self.config.model,
            input: &request.text,
            voice: &request.voice,
            speed: request.speed,
            response_format: "wav",
        };

        tracing::debug!(
            url = %self.speech_url(),
            text_len = request.text.len(),
            voice = %request.voice,
            speed = request.speed,
            "Sending TTS speech request"
        );

        let response = self
            .client
            .post(self.speech_url())
            .json(&http_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else if e.is_connect() {
                    TtsError::NetworkError(format!("Cannot connect to TTS service: {}", e))
                } else {
                    TtsError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TtsError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let audio_data = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                TtsError::Timeout
            } else {
                TtsError::InvalidResponse(format!("Failed to read audio: {}", e))
            }
        })?;

        let decoded = decode_wav(&audio_data)
            .map_err(|e| TtsError::InvalidResponse(format!("Undecodable audio: {}", e)))?;

        tracing::debug!(
            audio_size = audio_data.len(),
            samples = decoded.samples.len(),
            sample_rate = decoded.sample_rate,
            "TTS synthesis completed"
        );

        Ok(SegmentAudio {
            samples: decoded.samples,
            sample_rate: decoded.sample_rate,
        })
    }
}

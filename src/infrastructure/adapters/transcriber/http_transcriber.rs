//! HTTP Transcriber - 调用外部 Whisper 服务获取逐词时间戳
//!
//! 先把已上传的音频下载到临时文件（调用结束即删除），再以 multipart 提交到 OpenAI 兼容接口：
//! POST {base_url}/v1/audio/transcriptions
//! Form: file, model, response_format=verbose_json, timestamp_granularities[]=word
//! Response: {"words": [{"word", "start", "end"}]} 或 {"segments": [{"words": [...]}]}

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;

use crate::application::ports::{TranscribeError, TranscriberPort};
use crate::domain::WordTiming;
use crate::infrastructure::adapters::media::scratch_file;

/// HTTP 识别客户端配置
#[derive(Debug, Clone)]
pub struct HttpTranscriberConfig {
    pub base_url: String,
    pub model: String,
    pub language: Option<String>,
    /// 识别请求超时（秒）
    pub timeout_secs: u64,
    /// 音频下载超时（秒）
    pub fetch_timeout_secs: u64,
    /// 下载音频的临时目录，缺省为系统临时目录
    pub scratch_dir: Option<PathBuf>,
}

impl Default for HttpTranscriberConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            model: "base".to_string(),
            language: None,
            timeout_secs: 300,
            fetch_timeout_secs: 60,
            scratch_dir: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    words: Option<Vec<WordEntry>>,
    #[serde(default)]
    segments: Vec<SegmentEntry>,
}

#[derive(Debug, Deserialize)]
struct SegmentEntry {
    #[serde(default)]
    words: Vec<WordEntry>,
}

#[derive(Debug, Deserialize)]
struct WordEntry {
    word: String,
    start: f64,
    end: f64,
}

impl TranscriptionResponse {
    /// 顶层 words 优先，否则展开各 segment 的 words
    fn into_words(self) -> Vec<WordTiming> {
        let entries = match self.words {
            Some(words) if !words.is_empty() => words,
            _ => self.segments.into_iter().flat_map(|s| s.words).collect(),
        };
        entries
            .into_iter()
            .map(|w| WordTiming::new(w.start, w.end, w.word))
            .collect()
    }
}

/// HTTP 识别客户端
pub struct HttpTranscriber {
    client: Client,
    config: HttpTranscriberConfig,
}

impl HttpTranscriber {
    pub fn new(config: HttpTranscriberConfig) -> Result<Self, TranscribeError> {
        let client = Client::builder()
            .build()
            .map_err(|e| TranscribeError::IoError(e.to_string()))?;
        Ok(Self { client, config })
    }

    fn transcriptions_url(&self) -> String {
        format!(
            "{}/v1/audio/transcriptions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// 下载音频写入 `dest`，返回字节数
    async fn fetch_audio(&self, audio_url: &str, dest: &Path) -> Result<u64, TranscribeError> {
        let fetch_error = |e: reqwest::Error| {
            if e.is_timeout() {
                TranscribeError::Timeout
            } else {
                TranscribeError::FetchError(e.to_string())
            }
        };

        let mut response = self
            .client
            .get(audio_url)
            .timeout(Duration::from_secs(self.config.fetch_timeout_secs))
            .send()
            .await
            .map_err(fetch_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TranscribeError::FetchError(format!(
                "HTTP {} for {}",
                status, audio_url
            )));
        }

        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| TranscribeError::IoError(e.to_string()))?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await.map_err(fetch_error)? {
            file.write_all(&chunk)
                .await
                .map_err(|e| TranscribeError::IoError(e.to_string()))?;
            written += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| TranscribeError::IoError(e.to_string()))?;

        Ok(written)
    }

    fn form(&self, audio: Vec<u8>) -> Result<Form, TranscribeError> {
        let file = Part::bytes(audio)
            .file_name("audio.mp3")
            .mime_str("audio/mpeg")
            .map_err(|e| TranscribeError::IoError(e.to_string()))?;

        let mut form = Form::new()
            .part("file", file)
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "word");

        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }
        Ok(form)
    }
}

#[async_trait]
impl TranscriberPort for HttpTranscriber {
    async fn transcribe(&self, audio_url: &str) -> Result<Vec<WordTiming>, TranscribeError> {
        // 临时文件在本函数返回时删除，成功和失败路径都一样
        let scratch = scratch_file(self.config.scratch_dir.as_deref(), ".mp3")
            .map_err(|e| TranscribeError::IoError(format!("Failed to create temp file: {}", e)))?;
        let audio_size = self.fetch_audio(audio_url, scratch.path()).await?;
        tracing::debug!(
            audio_url = %audio_url,
            audio_size = audio_size,
            "Audio fetched for transcription"
        );

        let audio = tokio::fs::read(scratch.path())
            .await
            .map_err(|e| TranscribeError::IoError(e.to_string()))?;

        let response = self
            .client
            .post(self.transcriptions_url())
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .multipart(self.form(audio)?)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TranscribeError::Timeout
                } else {
                    TranscribeError::ServiceError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(TranscribeError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let body: TranscriptionResponse = response
            .json()
            .await
            .map_err(|e| TranscribeError::InvalidResponse(e.to_string()))?;

        Ok(body.into_words())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::test_support::{CannedResponse, TestServer};

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[test]
    fn test_parse_top_level_words() {
        let json = r#"{
            "text": "Hello world.",
            "words": [
                {"word": " Hello", "start": 0.0, "end": 0.42},
                {"word": " world.", "start": 0.42, "end": 0.9}
            ],
            "segments": []
        }"#;
        let body: TranscriptionResponse = serde_json::from_str(json).unwrap();
        let words = body.into_words();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].text, " Hello");
        assert_eq!(words[1].end, 0.9);
    }

    #[test]
    fn test_parse_segment_words() {
        let json = r#"{
            "segments": [
                {"id": 0, "text": "Hi.", "words": [{"word": "Hi.", "start": 0.1, "end": 0.3}]},
                {"id": 1, "text": "Bye.", "words": [{"word": "Bye.", "start": 1.0, "end": 1.2}]}
            ]
        }"#;
        let body: TranscriptionResponse = serde_json::from_str(json).unwrap();
        let words = body.into_words();
        assert_eq!(
            words.iter().map(|w| w.text.as_str()).collect::<Vec<_>>(),
            vec!["Hi.", "Bye."]
        );
    }

    #[test]
    fn test_parse_without_words() {
        let body: TranscriptionResponse = serde_json::from_str(r#"{"text": ""}"#).unwrap();
        assert!(body.into_words().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_audio_is_fetch_error() {
        let transcriber = HttpTranscriber::new(HttpTranscriberConfig {
            fetch_timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();
        let result = transcriber.transcribe("http://127.0.0.1:1/audio/x.mp3").await;
        assert!(matches!(
            result,
            Err(TranscribeError::FetchError(_)) | Err(TranscribeError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_transcribe_removes_temp_audio_after_success() {
        let server = TestServer::start(|request_line| {
            if request_line.starts_with("GET /media/audio/job.mp3") {
                CannedResponse::ok("audio/mpeg", b"ID3fake-mp3".to_vec())
            } else if request_line.starts_with("POST /v1/audio/transcriptions") {
                CannedResponse::ok(
                    "application/json",
                    r#"{"words": [{"word": "Hello.", "start": 0.0, "end": 0.4}]}"#,
                )
            } else {
                CannedResponse::status(404)
            }
        })
        .await;
        let scratch = tempfile::tempdir().unwrap();
        let transcriber = HttpTranscriber::new(HttpTranscriberConfig {
            base_url: server.base_url.clone(),
            scratch_dir: Some(scratch.path().to_path_buf()),
            fetch_timeout_secs: 5,
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();

        let words = transcriber
            .transcribe(&server.url("/media/audio/job.mp3"))
            .await
            .unwrap();

        assert_eq!(words.len(), 1);
        assert_eq!(words[0].text, "Hello.");
        assert_eq!(server.hits(), 2);
        assert!(is_empty_dir(scratch.path()));
    }

    #[tokio::test]
    async fn test_transcribe_removes_temp_audio_after_service_error() {
        let server = TestServer::start(|request_line| {
            if request_line.starts_with("GET ") {
                CannedResponse::ok("audio/mpeg", b"ID3fake-mp3".to_vec())
            } else {
                CannedResponse::status(500)
            }
        })
        .await;
        let scratch = tempfile::tempdir().unwrap();
        let transcriber = HttpTranscriber::new(HttpTranscriberConfig {
            base_url: server.base_url.clone(),
            scratch_dir: Some(scratch.path().to_path_buf()),
            fetch_timeout_secs: 5,
            timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();

        let result = transcriber
            .transcribe(&server.url("/media/audio/job.mp3"))
            .await;

        assert!(matches!(result, Err(TranscribeError::ServiceError(_))));
        assert_eq!(server.hits(), 2);
        assert!(is_empty_dir(scratch.path()));
    }

    #[tokio::test]
    async fn test_missing_audio_is_fetch_error() {
        let server = TestServer::start(|_| CannedResponse::status(404)).await;
        let scratch = tempfile::tempdir().unwrap();
        let transcriber = HttpTranscriber::new(HttpTranscriberConfig {
            scratch_dir: Some(scratch.path().to_path_buf()),
            fetch_timeout_secs: 5,
            ..Default::default()
        })
        .unwrap();

        let result = transcriber.transcribe(&server.url("/media/audio/x.mp3")).await;

        assert!(matches!(result, Err(TranscribeError::FetchError(_))));
        assert!(is_empty_dir(scratch.path()));
    }
}

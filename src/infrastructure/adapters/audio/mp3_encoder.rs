//! MP3 Encoder - 经 ffmpeg (libmp3lame) 将 PCM 编码为 MP3
//!
//! 样本先写成 16 位 WAV，通过 stdin 交给 ffmpeg，MP3 从 stdout 读回。

use async_trait::async_trait;
use std::time::Duration;

use super::wav_codec::encode_wav;
use crate::application::ports::{AudioEncoderPort, EncodeError};
use crate::domain::SynthesizedAudio;
use crate::infrastructure::adapters::media::{run_capture, ProcessError};

/// MP3 编码器配置
#[derive(Debug, Clone)]
pub struct Mp3EncoderConfig {
    pub ffmpeg_path: String,
    /// 比特率，如 "128k"
    pub bitrate: String,
    pub timeout_secs: u64,
}

impl Default for Mp3EncoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            bitrate: "128k".to_string(),
            timeout_secs: 300,
        }
    }
}

/// ffmpeg MP3 编码器
pub struct FfmpegMp3Encoder {
    config: Mp3EncoderConfig,
}

impl FfmpegMp3Encoder {
    pub fn new(config: Mp3EncoderConfig) -> Self {
        Self { config }
    }

    fn args(&self) -> Vec<String> {
        [
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "wav",
            "-i",
            "pipe:0",
            "-vn",
            "-c:a",
            "libmp3lame",
            "-b:a",
            self.config.bitrate.as_str(),
            "-f",
            "mp3",
            "pipe:1",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

#[async_trait]
impl AudioEncoderPort for FfmpegMp3Encoder {
    async fn encode_mp3(&self, audio: &SynthesizedAudio) -> Result<Vec<u8>, EncodeError> {
        if audio.is_empty() {
            return Err(EncodeError::InvalidInput("no samples to encode".to_string()));
        }

        let wav = encode_wav(&audio.samples, audio.sample_rate)
            .map_err(|e| EncodeError::InvalidInput(e.to_string()))?;

        let mp3 = run_capture(
            &self.config.ffmpeg_path,
            &self.args(),
            Some(wav),
            Duration::from_secs(self.config.timeout_secs),
        )
        .await
        .map_err(|e| match e {
            ProcessError::Spawn { .. } | ProcessError::Io(_) => EncodeError::IoError(e.to_string()),
            other => EncodeError::EncodingError(other.to_string()),
        })?;

        if mp3.is_empty() {
            return Err(EncodeError::EncodingError(
                "ffmpeg produced no MP3 output".to_string(),
            ));
        }

        tracing::debug!(
            samples = audio.samples.len(),
            sample_rate = audio.sample_rate,
            mp3_size = mp3.len(),
            "Encoded MP3"
        );

        Ok(mp3)
    }
}

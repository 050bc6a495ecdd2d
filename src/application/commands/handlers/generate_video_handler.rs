//! Generate Video Handler - 请求编排
//!
//! 文本 → 音频 → 转写 → 字幕 → 视频 → 缩略图，严格顺序执行，不重试。
//! 只有转写失败会被吸收（降级为无字幕），其余失败直接返回。

use std::sync::Arc;
use std::time::Instant;

use crate::application::commands::generate_video_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    AudioEncoderPort, CompositeRequest, ObjectStoragePort, SpeechRequest, TranscriberPort,
    TtsEnginePort, VideoCompositorPort,
};
use crate::domain::{
    render_document, split_sentences, ArtifactId, ArtifactKind, ArtifactSet, Canvas,
    PipelineProgress, PipelineStage, SubtitleStyle, SynthesizedAudio, Transcript,
};

/// 流水线选项
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// 字幕画布尺寸
    pub canvas: Canvas,
    /// 字幕样式
    pub style: SubtitleStyle,
    /// 失败时删除本次请求已上传的产物
    pub rollback_on_failure: bool,
}

/// GenerateVideo Handler - 生成解说视频
pub struct GenerateVideoHandler {
    tts_engine: Arc<dyn TtsEnginePort>,
    audio_encoder: Arc<dyn AudioEncoderPort>,
    transcriber: Arc<dyn TranscriberPort>,
    compositor: Arc<dyn VideoCompositorPort>,
    storage: Arc<dyn ObjectStoragePort>,
    options: PipelineOptions,
}

impl GenerateVideoHandler {
    pub fn new(
        tts_engine: Arc<dyn TtsEnginePort>,
        audio_encoder: Arc<dyn AudioEncoderPort>,
        transcriber: Arc<dyn TranscriberPort>,
        compositor: Arc<dyn VideoCompositorPort>,
        storage: Arc<dyn ObjectStoragePort>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            tts_engine,
            audio_encoder,
            transcriber,
            compositor,
            storage,
            options,
        }
    }

    /// `progress` 由鉴权层推进到 Authorized 后传入
    pub async fn handle(
        &self,
        cmd: GenerateVideoCommand,
        mut progress: PipelineProgress,
    ) -> Result<GenerateVideoResponse, ApplicationError> {
        if progress.stage() != PipelineStage::Authorized {
            return Err(ApplicationError::internal(format!(
                "pipeline started from {} instead of authorized",
                progress.stage()
            )));
        }
        validate_command(&cmd)?;

        let started = Instant::now();
        let mut uploaded_keys: Vec<String> = Vec::new();

        tracing::info!(
            artifact_id = %cmd.artifact_id,
            voice = %cmd.voice,
            speed = cmd.speed,
            text_len = cmd.text.len(),
            "Video generation started"
        );

        match self.run(&cmd, &mut progress, &mut uploaded_keys).await {
            Ok(response) => {
                tracing::info!(
                    artifact_id = %cmd.artifact_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    subtitles_degraded = response.subtitles_degraded,
                    "Video generation completed"
                );
                Ok(response)
            }
            Err(e) => {
                let failed_at = progress.fail();
                tracing::error!(
                    artifact_id = %cmd.artifact_id,
                    stage = %failed_at,
                    uploaded = uploaded_keys.len(),
                    error = %e,
                    "Video generation failed"
                );
                if self.options.rollback_on_failure {
                    self.rollback(&uploaded_keys).await;
                }
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        cmd: &GenerateVideoCommand,
        progress: &mut PipelineProgress,
        uploaded_keys: &mut Vec<String>,
    ) -> Result<GenerateVideoResponse, ApplicationError> {
        let mut artifacts = ArtifactSet::default();
        let id = &cmd.artifact_id;

        // 1. 语音合成 + MP3 编码 + 上传
        let audio = self.synthesize(&cmd.text, &cmd.voice, cmd.speed).await?;
        if audio.is_empty() {
            return Err(ApplicationError::SynthesisError(
                "No audio produced: input text has no non-blank segments".to_string(),
            ));
        }
        let mp3 = self.audio_encoder.encode_mp3(&audio).await?;
        let audio_url = self
            .upload(ArtifactKind::Audio, id, mp3, uploaded_keys)
            .await?;
        artifacts.set(ArtifactKind::Audio, audio_url.clone())?;
        progress.advance(PipelineStage::AudioReady)?;

        // 2. 逐词转写（失败降级为空）
        let transcript = self.transcribe(&audio_url).await;
        progress.advance(PipelineStage::TranscriptReady)?;

        // 3. 字幕文档
        let document = render_document(&transcript.words, self.options.canvas, &self.options.style);
        tracing::debug!(
            artifact_id = %id,
            events = document.event_count(),
            "Subtitle document rendered"
        );
        let ass_url = self
            .upload(ArtifactKind::Subtitle, id, document.into_bytes(), uploaded_keys)
            .await?;
        artifacts.set(ArtifactKind::Subtitle, ass_url.clone())?;
        progress.advance(PipelineStage::SubtitleReady)?;

        // 4. 视频合成
        let video = self
            .compositor
            .composite(&CompositeRequest {
                audio_url: audio_url.clone(),
                subtitle_url: ass_url,
                background_video_url: cmd.background_video_url.clone(),
            })
            .await?;
        let video_url = self
            .upload(ArtifactKind::Video, id, video, uploaded_keys)
            .await?;
        artifacts.set(ArtifactKind::Video, video_url.clone())?;
        progress.advance(PipelineStage::VideoReady)?;

        // 5. 缩略图
        let thumbnail = self.compositor.extract_thumbnail(&video_url).await?;
        let thumbnail_url = self
            .upload(ArtifactKind::Thumbnail, id, thumbnail, uploaded_keys)
            .await?;
        artifacts.set(ArtifactKind::Thumbnail, thumbnail_url)?;
        progress.advance(PipelineStage::ThumbnailReady)?;

        let urls = artifacts.complete()?;
        progress.advance(PipelineStage::Responded)?;

        Ok(GenerateVideoResponse {
            urls,
            subtitles_degraded: transcript.degraded,
        })
    }

    /// 逐句合成并按顺序拼接
    ///
    /// 任一句段失败即整体失败；全空白输入返回空音频。
    pub async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        speed: f32,
    ) -> Result<SynthesizedAudio, ApplicationError> {
        let segments = split_sentences(text);
        let mut parts = Vec::with_capacity(segments.len());

        for (index, segment) in segments.into_iter().enumerate() {
            let request = SpeechRequest {
                text: segment,
                voice: voice.to_string(),
                speed,
            };
            let audio = self.tts_engine.synthesize(&request).await?;
            tracing::debug!(
                segment = index,
                samples = audio.samples.len(),
                sample_rate = audio.sample_rate,
                "Segment synthesized"
            );
            parts.push(audio);
        }

        let audio = SynthesizedAudio::concat(parts)?;
        if audio.is_empty() {
            tracing::warn!("No audio to process");
        }
        Ok(audio)
    }

    /// 转写音频，任何失败都降级为空结果
    async fn transcribe(&self, audio_url: &str) -> Transcript {
        match self.transcriber.transcribe(audio_url).await {
            Ok(words) => {
                let transcript = Transcript::new(words);
                tracing::info!(words = transcript.words.len(), "Transcription complete");
                transcript
            }
            Err(e) => {
                tracing::warn!(
                    audio_url = %audio_url,
                    error = %e,
                    "Transcription failed, continuing without subtitles"
                );
                Transcript::degraded()
            }
        }
    }

    async fn upload(
        &self,
        kind: ArtifactKind,
        id: &ArtifactId,
        data: Vec<u8>,
        uploaded_keys: &mut Vec<String>,
    ) -> Result<String, ApplicationError> {
        let key = kind.key(id);
        let size = data.len();
        let url = self.storage.upload(&key, data, kind.content_type()).await?;
        uploaded_keys.push(key.clone());

        tracing::info!(key = %key, size = size, url = %url, "Artifact uploaded");
        Ok(url)
    }

    /// 删除本次请求已上传的产物，删除失败只记录日志
    async fn rollback(&self, keys: &[String]) {
        for key in keys {
            match self.storage.delete(key).await {
                Ok(()) => tracing::info!(key = %key, "Rolled back artifact"),
                Err(e) => tracing::warn!(key = %key, error = %e, "Failed to roll back artifact"),
            }
        }
    }
}

fn validate_command(cmd: &GenerateVideoCommand) -> Result<(), ApplicationError> {
    if !cmd.speed.is_finite() || cmd.speed <= 0.0 {
        return Err(ApplicationError::validation(format!(
            "speed must be a positive number, got {}",
            cmd.speed
        )));
    }
    if cmd.voice.trim().is_empty() {
        return Err(ApplicationError::validation("voice cannot be empty"));
    }
    if cmd.background_video_url.trim().is_empty() {
        return Err(ApplicationError::validation("bg_video_url cannot be empty"));
    }
    Ok(())
}

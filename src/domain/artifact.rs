//! 产物（上传到对象存储的文件）
//!
//! 存储 key 完全由调用方提供的 ID 决定，同一 ID 的重复请求会覆盖之前的产物。

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArtifactError {
    #[error("Invalid artifact id: {0}")]
    InvalidId(String),

    #[error("{0} URL already set")]
    AlreadySet(ArtifactKind),

    #[error("{0} URL missing")]
    Missing(ArtifactKind),
}

/// 产物 ID（请求体中的 `useduuid`）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// 校验 ID：非空、不含路径分隔符和控制字符
    pub fn parse(raw: &str) -> Result<Self, ArtifactError> {
        let id = raw.trim();
        if id.is_empty() {
            return Err(ArtifactError::InvalidId("id cannot be empty".to_string()));
        }
        if id.contains(['/', '\\']) || id == "." || id == ".." {
            return Err(ArtifactError::InvalidId(format!(
                "id cannot contain path separators: {}",
                id
            )));
        }
        if id.chars().any(char::is_control) {
            return Err(ArtifactError::InvalidId(
                "id cannot contain control characters".to_string(),
            ));
        }
        Ok(Self(id.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// 产物类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Audio,
    Subtitle,
    Video,
    Thumbnail,
}

impl ArtifactKind {
    fn prefix(&self) -> &'static str {
        match self {
            ArtifactKind::Audio => "audio",
            ArtifactKind::Subtitle => "ass",
            ArtifactKind::Video => "videos",
            ArtifactKind::Thumbnail => "thumbnail",
        }
    }

    fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::Audio => "mp3",
            ArtifactKind::Subtitle => "ass",
            ArtifactKind::Video => "mp4",
            ArtifactKind::Thumbnail => "jpg",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ArtifactKind::Audio => "audio/mpeg",
            ArtifactKind::Subtitle => "text/x-ssa",
            ArtifactKind::Video => "video/mp4",
            ArtifactKind::Thumbnail => "image/jpeg",
        }
    }

    /// 对象存储 key，如 `audio/{id}.mp3`
    pub fn key(&self, id: &ArtifactId) -> String {
        format!("{}/{}.{}", self.prefix(), id.as_str(), self.extension())
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArtifactKind::Audio => write!(f, "audio"),
            ArtifactKind::Subtitle => write!(f, "subtitle"),
            ArtifactKind::Video => write!(f, "video"),
            ArtifactKind::Thumbnail => write!(f, "thumbnail"),
        }
    }
}

/// 流水线过程中逐步收集的产物 URL，每个只能设置一次
#[derive(Debug, Clone, Default)]
pub struct ArtifactSet {
    audio_url: Option<String>,
    ass_url: Option<String>,
    video_url: Option<String>,
    thumbnail_url: Option<String>,
}

impl ArtifactSet {
    fn slot(&mut self, kind: ArtifactKind) -> &mut Option<String> {
        match kind {
            ArtifactKind::Audio => &mut self.audio_url,
            ArtifactKind::Subtitle => &mut self.ass_url,
            ArtifactKind::Video => &mut self.video_url,
            ArtifactKind::Thumbnail => &mut self.thumbnail_url,
        }
    }

    pub fn set(&mut self, kind: ArtifactKind, url: String) -> Result<(), ArtifactError> {
        let slot = self.slot(kind);
        if slot.is_some() {
            return Err(ArtifactError::AlreadySet(kind));
        }
        *slot = Some(url);
        Ok(())
    }

    /// 全部四个 URL 就绪后生成最终结果
    pub fn complete(self) -> Result<ArtifactUrls, ArtifactError> {
        Ok(ArtifactUrls {
            audio_url: self.audio_url.ok_or(ArtifactError::Missing(ArtifactKind::Audio))?,
            ass_url: self.ass_url.ok_or(ArtifactError::Missing(ArtifactKind::Subtitle))?,
            video_url: self.video_url.ok_or(ArtifactError::Missing(ArtifactKind::Video))?,
            thumbnail_url: self
                .thumbnail_url
                .ok_or(ArtifactError::Missing(ArtifactKind::Thumbnail))?,
        })
    }
}

/// 完整的产物 URL 集合
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactUrls {
    pub audio_url: String,
    pub ass_url: String,
    pub video_url: String,
    pub thumbnail_url: String,
}

//! Generate Video Commands - 文本生成解说视频

use crate::domain::{ArtifactId, ArtifactUrls};

/// 生成视频命令
#[derive(Debug, Clone)]
pub struct GenerateVideoCommand {
    pub text: String,
    pub voice: String,
    pub speed: f32,
    pub background_video_url: String,
    pub artifact_id: ArtifactId,
}

/// 生成视频响应
#[derive(Debug, Clone)]
pub struct GenerateVideoResponse {
    pub urls: ArtifactUrls,
    /// 转写失败后降级为无字幕
    pub subtitles_degraded: bool,
}

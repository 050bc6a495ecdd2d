//! Data Transfer Objects

use serde::{Deserialize, Serialize};

use crate::application::{GenerateVideoCommand, GenerateVideoResponse};
use crate::domain::ArtifactId;
use crate::infrastructure::http::error::ApiError;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 成功响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

// ============================================================================
// Generate DTOs
// ============================================================================

/// 生成请求体，所有字段必填
#[derive(Debug, Deserialize)]
pub struct GenerateVideoRequest {
    pub text: String,
    pub voice: String,
    pub speed: f32,
    pub bg_video_url: String,
    /// 调用方提供的产物 ID，决定对象 key
    pub useduuid: String,
}

impl GenerateVideoRequest {
    pub fn into_command(self) -> Result<GenerateVideoCommand, ApiError> {
        let artifact_id = ArtifactId::parse(&self.useduuid)
            .map_err(|e| ApiError::Unprocessable(e.to_string()))?;

        Ok(GenerateVideoCommand {
            text: self.text,
            voice: self.voice,
            speed: self.speed,
            background_video_url: self.bg_video_url,
            artifact_id,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateVideoData {
    pub audio_url: String,
    pub video_url: String,
    pub ass_url: String,
    pub thumbnail_url: String,
    pub subtitles_degraded: bool,
}

impl From<GenerateVideoResponse> for GenerateVideoData {
    fn from(response: GenerateVideoResponse) -> Self {
        let urls = response.urls;
        Self {
            audio_url: urls.audio_url,
            video_url: urls.video_url,
            ass_url: urls.ass_url,
            thumbnail_url: urls.thumbnail_url,
            subtitles_degraded: response.subtitles_degraded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(useduuid: &str) -> GenerateVideoRequest {
        serde_json::from_value(serde_json::json!({
            "text": "Hello.",
            "voice": "af_bella",
            "speed": 1.0,
            "bg_video_url": "https://cdn/bg.mp4",
            "useduuid": useduuid,
        }))
        .unwrap()
    }

    #[test]
    fn test_into_command() {
        let cmd = request("job-42").into_command().unwrap();
        assert_eq!(cmd.artifact_id.as_str(), "job-42");
        assert_eq!(cmd.background_video_url, "https://cdn/bg.mp4");
    }

    #[test]
    fn test_into_command_rejects_bad_id() {
        assert!(matches!(
            request("../etc").into_command(),
            Err(ApiError::Unprocessable(_))
        ));
        assert!(request("").into_command().is_err());
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let result: Result<GenerateVideoRequest, _> =
            serde_json::from_value(serde_json::json!({"text": "Hello."}));
        assert!(result.is_err());
    }
}

//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 请求鉴权配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// TTS 引擎配置
    #[serde(default)]
    pub tts: TtsConfig,

    /// 语音识别配置
    #[serde(default)]
    pub transcriber: TranscriberConfig,

    /// 对象存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// ffmpeg / ffprobe 配置
    #[serde(default)]
    pub media: MediaConfig,

    /// 字幕配置
    #[serde(default)]
    pub subtitle: SubtitleConfig,

    /// 流水线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体大小上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_max_body_bytes() -> usize {
    2 * 1024 * 1024 // 2 MB，纯文本请求足够
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 请求鉴权配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// `access_token` 请求头必须等于此值
    #[serde(default)]
    pub access_token: String,
}

/// TTS 后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TtsBackend {
    /// 外部 HTTP TTS 服务
    #[default]
    Http,
    /// 固定静音输出，用于本地调试
    Fake,
}

/// TTS 引擎配置
#[derive(Debug, Clone, Deserialize)]
pub struct TtsConfig {
    #[serde(default)]
    pub backend: TtsBackend,

    /// TTS 服务基础 URL
    #[serde(default = "default_tts_url")]
    pub url: String,

    /// 模型名
    #[serde(default = "default_tts_model")]
    pub model: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_tts_timeout")]
    pub timeout_secs: u64,
}

fn default_tts_url() -> String {
    "http://localhost:8880".to_string()
}

fn default_tts_model() -> String {
    "kokoro".to_string()
}

fn default_tts_timeout() -> u64 {
    120
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            backend: TtsBackend::default(),
            url: default_tts_url(),
            model: default_tts_model(),
            timeout_secs: default_tts_timeout(),
        }
    }
}

/// 语音识别配置
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriberConfig {
    /// 识别服务基础 URL（OpenAI 兼容接口）
    #[serde(default = "default_transcriber_url")]
    pub url: String,

    /// Whisper 模型名
    #[serde(default = "default_transcriber_model")]
    pub model: String,

    /// 语言提示，None 表示自动检测
    #[serde(default)]
    pub language: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_transcriber_timeout")]
    pub timeout_secs: u64,
}

fn default_transcriber_url() -> String {
    "http://localhost:8001".to_string()
}

fn default_transcriber_model() -> String {
    "base".to_string()
}

fn default_transcriber_timeout() -> u64 {
    300
}

impl Default for TranscriberConfig {
    fn default() -> Self {
        Self {
            url: default_transcriber_url(),
            model: default_transcriber_model(),
            language: None,
            timeout_secs: default_transcriber_timeout(),
        }
    }
}

/// 存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3 兼容存储（MinIO 等）
    #[default]
    S3,
    /// 进程内存储，用于本地调试
    Memory,
}

/// 对象存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// 存储服务地址，不带协议时根据 `secure` 补全
    #[serde(default)]
    pub endpoint: String,

    #[serde(default)]
    pub access_key: String,

    #[serde(default)]
    pub secret_key: String,

    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// true 使用 HTTPS
    #[serde(default)]
    pub secure: bool,

    #[serde(default = "default_region")]
    pub region: String,

    /// 公开访问地址，未设置时使用 endpoint
    #[serde(default)]
    pub public_base_url: Option<String>,
}

fn default_bucket() -> String {
    "narrate".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            endpoint: String::new(),
            access_key: String::new(),
            secret_key: String::new(),
            bucket: default_bucket(),
            secure: false,
            region: default_region(),
            public_base_url: None,
        }
    }
}

impl StorageConfig {
    /// 带协议的 endpoint
    pub fn endpoint_url(&self) -> String {
        let endpoint = self.endpoint.trim().trim_end_matches('/');
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            endpoint.to_string()
        } else {
            let scheme = if self.secure { "https" } else { "http" };
            format!("{}://{}", scheme, endpoint)
        }
    }

    /// 生成产物 URL 使用的基础地址
    pub fn public_base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) if !url.trim().is_empty() => url.trim().trim_end_matches('/').to_string(),
            _ => self.endpoint_url(),
        }
    }
}

/// ffmpeg / ffprobe 配置
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// 单次 ffmpeg 调用的超时时间（秒）
    #[serde(default = "default_encode_timeout")]
    pub encode_timeout_secs: u64,

    /// 下载远程文件（字幕、音频）的超时时间（秒）
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// 缩略图截取位置（秒）
    #[serde(default = "default_thumbnail_offset")]
    pub thumbnail_offset_secs: f64,

    /// MP3 比特率，如 "128k"
    #[serde(default = "default_mp3_bitrate")]
    pub mp3_bitrate: String,

    /// 下载中间文件的临时目录，缺省为系统临时目录
    #[serde(default)]
    pub scratch_dir: Option<PathBuf>,
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_encode_timeout() -> u64 {
    900 // 15 分钟
}

fn default_fetch_timeout() -> u64 {
    60
}

fn default_thumbnail_offset() -> f64 {
    1.0
}

fn default_mp3_bitrate() -> String {
    "128k".to_string()
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            encode_timeout_secs: default_encode_timeout(),
            fetch_timeout_secs: default_fetch_timeout(),
            thumbnail_offset_secs: default_thumbnail_offset(),
            mp3_bitrate: default_mp3_bitrate(),
            scratch_dir: None,
        }
    }
}

/// 字幕配置
#[derive(Debug, Clone, Deserialize)]
pub struct SubtitleConfig {
    #[serde(default = "default_video_width")]
    pub width: u32,

    #[serde(default = "default_video_height")]
    pub height: u32,

    #[serde(default = "default_font_name")]
    pub font_name: String,

    #[serde(default = "default_font_size")]
    pub font_size: u32,
}

fn default_video_width() -> u32 {
    1920
}

fn default_video_height() -> u32 {
    1080
}

fn default_font_name() -> String {
    "Arial Black".to_string()
}

fn default_font_size() -> u32 {
    72
}

impl Default for SubtitleConfig {
    fn default() -> Self {
        Self {
            width: default_video_width(),
            height: default_video_height(),
            font_name: default_font_name(),
            font_size: default_font_size(),
        }
    }
}

/// 流水线配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    /// 失败时删除本次请求已上传的产物
    #[serde(default)]
    pub rollback_on_failure: bool,
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.tts.backend, TtsBackend::Http);
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.subtitle.width, 1920);
        assert!(!config.pipeline.rollback_on_failure);
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:8000");
    }

    #[test]
    fn test_endpoint_scheme_follows_secure_flag() {
        let mut storage = StorageConfig {
            endpoint: "minio.local:9000/".to_string(),
            ..Default::default()
        };
        assert_eq!(storage.endpoint_url(), "http://minio.local:9000");

        storage.secure = true;
        assert_eq!(storage.endpoint_url(), "https://minio.local:9000");

        storage.endpoint = "http://explicit:9000".to_string();
        assert_eq!(storage.endpoint_url(), "http://explicit:9000");
    }

    #[test]
    fn test_public_base_url_overrides_endpoint() {
        let storage = StorageConfig {
            endpoint: "http://minio:9000".to_string(),
            public_base_url: Some("https://cdn.example.com/".to_string()),
            ..Default::default()
        };
        assert_eq!(storage.public_base_url(), "https://cdn.example.com");
    }
}

//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 兼容旧部署的环境变量（MINIO_*、GENERATE_VIDEO_SECRET）
//! 2. 环境变量（NARRATE_ 前缀）
//! 3. 配置文件（config.toml）
//! 4. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, StorageBackend, TtsBackend};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 旧部署使用的环境变量 → 配置 key
const LEGACY_STRING_VARS: &[(&str, &str)] = &[
    ("MINIO_ENDPOINT", "storage.endpoint"),
    ("MINIO_ACCESS_KEY", "storage.access_key"),
    ("MINIO_SECRET_KEY", "storage.secret_key"),
    ("MINIO_BUCKET_NAME", "storage.bucket"),
    ("GENERATE_VIDEO_SECRET", "auth.access_token"),
];

const LEGACY_SECURE_VAR: &str = "MINIO_SECURE";

/// 旧环境变量覆盖值
#[derive(Debug, Clone, PartialEq)]
enum LegacyValue {
    Text(String),
    Flag(bool),
}

/// 解析布尔型环境变量，无法识别的值返回 None
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// 收集旧环境变量覆盖（`lookup` 便于测试注入）
fn legacy_overrides<F>(lookup: F) -> Result<Vec<(&'static str, LegacyValue)>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut overrides = Vec::new();

    for (var, key) in LEGACY_STRING_VARS {
        if let Some(value) = lookup(var) {
            overrides.push((*key, LegacyValue::Text(value)));
        }
    }

    if let Some(raw) = lookup(LEGACY_SECURE_VAR) {
        let flag = parse_flag(&raw).ok_or_else(|| {
            ConfigError::ParseError(format!("{} must be a boolean, got '{}'", LEGACY_SECURE_VAR, raw))
        })?;
        overrides.push(("storage.secure", LegacyValue::Flag(flag)));
    }

    Ok(overrides)
}

/// 加载应用配置
///
/// # 环境变量示例
/// - `NARRATE_SERVER__PORT=8000`
/// - `NARRATE_TTS__URL=http://kokoro:8880`
/// - `NARRATE_STORAGE__BUCKET=media`
/// - `MINIO_ENDPOINT=http://minio:9000`（兼容旧变量）
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 首先设置默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 8000)?
        .set_default("tts.backend", "http")?
        .set_default("tts.url", "http://localhost:8880")?
        .set_default("transcriber.url", "http://localhost:8001")?
        .set_default("storage.backend", "s3")?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 添加配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 添加环境变量
    // 前缀: NARRATE_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("NARRATE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    // 4. 旧环境变量（最高优先级）
    for (key, value) in legacy_overrides(|var| std::env::var(var).ok())? {
        builder = match value {
            LegacyValue::Text(text) => builder.set_override(key, text)?,
            LegacyValue::Flag(flag) => builder.set_override(key, flag)?,
        };
    }

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.auth.access_token.is_empty() {
        return Err(ConfigError::ValidationError(
            "Access token (auth.access_token / GENERATE_VIDEO_SECRET) must be set".to_string(),
        ));
    }

    if config.tts.backend == TtsBackend::Http && config.tts.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "TTS URL cannot be empty".to_string(),
        ));
    }

    if config.transcriber.url.is_empty() {
        return Err(ConfigError::ValidationError(
            "Transcriber URL cannot be empty".to_string(),
        ));
    }

    if config.storage.backend == StorageBackend::S3 {
        let storage = &config.storage;
        let missing = [
            ("endpoint", &storage.endpoint),
            ("access_key", &storage.access_key),
            ("secret_key", &storage.secret_key),
            ("bucket", &storage.bucket),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty());

        if let Some((name, _)) = missing {
            return Err(ConfigError::ValidationError(format!(
                "storage.{} cannot be empty",
                name
            )));
        }
    }

    if config.subtitle.width == 0 || config.subtitle.height == 0 {
        return Err(ConfigError::ValidationError(
            "Subtitle canvas size cannot be 0".to_string(),
        ));
    }

    if config.media.encode_timeout_secs == 0 || config.media.fetch_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Media timeouts cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志），不输出密钥
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("TTS Backend: {:?}", config.tts.backend);
    tracing::info!("TTS URL: {}", config.tts.url);
    tracing::info!("TTS Timeout: {}s", config.tts.timeout_secs);
    tracing::info!("Transcriber URL: {}", config.transcriber.url);
    tracing::info!("Transcriber Model: {}", config.transcriber.model);
    tracing::info!("Storage Backend: {:?}", config.storage.backend);
    if config.storage.backend == StorageBackend::S3 {
        tracing::info!("Storage Endpoint: {}", config.storage.endpoint_url());
        tracing::info!("Storage Bucket: {}", config.storage.bucket);
    }
    tracing::info!("FFmpeg: {}", config.media.ffmpeg_path);
    tracing::info!("Encode Timeout: {}s", config.media.encode_timeout_secs);
    tracing::info!(
        "Subtitle Canvas: {}x{}",
        config.subtitle.width,
        config.subtitle.height
    );
    tracing::info!("Rollback On Failure: {}", config.pipeline.rollback_on_failure);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}

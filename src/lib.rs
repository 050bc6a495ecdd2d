//! Narrate - 文本生成解说短视频服务
//!
//! 架构设计: DDD + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - 句段分割、音频拼接、逐词时间戳、ASS 字幕渲染、产物 key、流水线状态机
//!
//! 应用层 (application/):
//! - Ports: TtsEngine, Transcriber, AudioEncoder, VideoCompositor, ObjectStorage
//! - Commands: GenerateVideo 命令处理器
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 生成接口 + 健康检查
//! - Adapters: HTTP TTS / Whisper 客户端, ffmpeg 编码与合成, S3 存储

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};

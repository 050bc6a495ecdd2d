//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TtsEngine、Transcriber、ObjectStorage、VideoCompositor、AudioEncoder）
//! - commands: 生成视频命令及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    handlers::{GenerateVideoHandler, PipelineOptions},
    GenerateVideoCommand, GenerateVideoResponse,
};

pub use error::ApplicationError;

pub use ports::{
    // Audio encoder
    AudioEncoderPort,
    EncodeError,
    // Object storage
    ObjectStoragePort,
    StorageError,
    // Transcriber
    TranscribeError,
    TranscriberPort,
    // TTS engine
    SpeechRequest,
    TtsEnginePort,
    TtsError,
    // Video compositor
    CompositeRequest,
    CompositorError,
    VideoCompositorPort,
};

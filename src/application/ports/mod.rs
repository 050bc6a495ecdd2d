//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod audio_encoder;
mod object_storage;
mod transcriber;
mod tts_engine;
mod video_compositor;

pub use audio_encoder::{AudioEncoderPort, EncodeError};
pub use object_storage::{ObjectStoragePort, StorageError};
pub use transcriber::{TranscribeError, TranscriberPort};
pub use tts_engine::{SpeechRequest, TtsEnginePort, TtsError};
pub use video_compositor::{CompositeRequest, CompositorError, VideoCompositorPort};

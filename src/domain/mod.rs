//! Domain Layer - 领域层
//!
//! 纯计算逻辑，不依赖任何外部服务:
//! - text_segmenter: 句段分割
//! - speech: 合成音频拼接
//! - transcript: 逐词时间戳
//! - subtitle: ASS 动画字幕渲染
//! - artifact: 产物 key 与 URL 集合
//! - pipeline: 请求流水线状态机

pub mod artifact;
pub mod pipeline;
pub mod speech;
pub mod subtitle;
pub mod transcript;

mod text_segmenter;

pub use artifact::{ArtifactError, ArtifactId, ArtifactKind, ArtifactSet, ArtifactUrls};
pub use pipeline::{PipelineProgress, PipelineStage, TransitionError};
pub use speech::{SegmentAudio, SpeechError, SynthesizedAudio};
pub use subtitle::{render_document, Canvas, SubtitleDocument, SubtitleStyle};
pub use text_segmenter::split_sentences;
pub use transcript::{Transcript, WordTiming};

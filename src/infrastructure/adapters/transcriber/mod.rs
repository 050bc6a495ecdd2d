//! Transcriber Adapter - Whisper HTTP 客户端

mod http_transcriber;

pub use http_transcriber::{HttpTranscriber, HttpTranscriberConfig};

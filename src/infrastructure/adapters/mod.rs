//! Infrastructure Adapters
//!
//! 六边形架构的适配器实现

pub mod audio;
pub mod media;
pub mod storage;
pub mod transcriber;
pub mod tts;

#[cfg(test)]
pub(crate) mod test_support;

pub use audio::*;
pub use media::*;
pub use storage::*;
pub use transcriber::*;
pub use tts::*;

//! Media Adapter - ffmpeg / ffprobe 子进程封装与视频合成

mod ffmpeg_compositor;
mod process;
mod scratch;

pub use ffmpeg_compositor::{FfmpegCompositor, FfmpegCompositorConfig};
pub use process::{run_capture, ProcessError};
pub use scratch::scratch_file;

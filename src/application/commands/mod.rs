//! 应用层 - 命令
//!
//! 每个 HTTP 请求对应一条命令，由 handler 顺序执行

mod generate_video_commands;

pub mod handlers;

pub use generate_video_commands::*;

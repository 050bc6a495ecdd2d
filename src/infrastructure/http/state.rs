//! Application State
//!
//! 所有请求共享的只读状态，启动时构建一次

use crate::application::GenerateVideoHandler;

/// 应用状态
pub struct AppState {
    /// `access_token` 请求头的期望值
    pub access_token: String,

    // ========== Command Handlers ==========
    pub generate_video_handler: GenerateVideoHandler,
}

impl AppState {
    pub fn new(access_token: impl Into<String>, generate_video_handler: GenerateVideoHandler) -> Self {
        Self {
            access_token: access_token.into(),
            generate_video_handler,
        }
    }
}

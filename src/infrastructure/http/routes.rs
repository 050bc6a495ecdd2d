//! HTTP Routes
//!
//! API Endpoints:
//! - /           POST  生成解说视频（需要 access_token 请求头）
//! - /api/ping   GET   健康检查

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(handlers::generate_video))
        .nest("/api", api_routes())
}

/// API 路由
fn api_routes() -> Router<Arc<AppState>> {
    Router::new().route("/ping", get(handlers::ping))
}

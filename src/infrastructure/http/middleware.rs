//! HTTP Middleware
//!
//! 请求耗时与错误状态码日志

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;

/// 错误状态码日志中间件
///
/// 4xx 记 warn，5xx 记 error，附带耗时。生成请求耗时较长，成功响应也记录一条 info。
/// 错误详情在 ApiError::into_response() 中记录
pub async fn error_logging_middleware(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let started = Instant::now();

    let response = next.run(request).await;
    let status = response.status();
    let elapsed_ms = started.elapsed().as_millis() as u64;

    if status.is_server_error() {
        tracing::error!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP server error"
        );
    } else if status.is_client_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP client error"
        );
    } else if method == axum::http::Method::POST {
        tracing::info!(
            method = %method,
            uri = %uri,
            status = status.as_u16(),
            elapsed_ms = elapsed_ms,
            "HTTP request completed"
        );
    }

    response
}

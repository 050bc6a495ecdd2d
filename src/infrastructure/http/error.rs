//! HTTP Error Handling
//!
//! 所有错误响应形如 `{"detail": "..."}`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::application::ApplicationError;

/// 统一错误响应格式
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl ErrorResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// API 错误
#[derive(Debug)]
pub enum ApiError {
    /// `access_token` 缺失或不匹配
    Unauthorized,
    /// 请求体无法解析或字段非法
    Unprocessable(String),
    /// 流水线失败
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let response = match self {
            ApiError::Unauthorized => {
                tracing::warn!("Rejected request with invalid access token");
                ErrorResponse::new("Unauthorized")
            }
            ApiError::Unprocessable(msg) => {
                tracing::warn!(error = %msg, "Unprocessable request");
                ErrorResponse::new(msg)
            }
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                ErrorResponse::new(msg)
            }
        };

        (status, Json(response)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::ValidationError(msg) => ApiError::Unprocessable(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

//! Request Extractors
//!
//! - `Authorized`: 校验 `access_token` 请求头，先于请求体解析执行
//! - `ApiJson`: JSON 请求体，解析失败返回 422 `{detail}`

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::{request::Parts, HeaderMap},
    Json,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use super::error::ApiError;
use super::state::AppState;
use crate::domain::{PipelineProgress, PipelineStage, TransitionError};

/// 鉴权请求头名
pub const ACCESS_TOKEN_HEADER: &str = "access_token";

/// 常量时间比较，避免按前缀泄露 token
fn token_matches(provided: &[u8], expected: &[u8]) -> bool {
    if provided.len() != expected.len() {
        return false;
    }
    provided
        .iter()
        .zip(expected)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}

/// 从 Received 出发校验请求头，结果为 Authorized 或 Rejected
fn authorize(headers: &HeaderMap, expected: &str) -> Result<PipelineProgress, TransitionError> {
    let mut progress = PipelineProgress::new();
    let accepted = !expected.is_empty()
        && headers
            .get(ACCESS_TOKEN_HEADER)
            .is_some_and(|provided| token_matches(provided.as_bytes(), expected.as_bytes()));

    if accepted {
        progress.advance(PipelineStage::Authorized)?;
    } else {
        progress.reject()?;
    }
    Ok(progress)
}

/// 已通过 `access_token` 校验的请求，携带已推进到 Authorized 的流水线进度
#[derive(Debug, Clone)]
pub struct Authorized(pub PipelineProgress);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Authorized {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let progress = authorize(&parts.headers, &state.access_token)
            .map_err(|e| ApiError::Internal(e.to_string()))?;

        match progress.stage() {
            PipelineStage::Authorized => Ok(Authorized(progress)),
            stage => {
                tracing::debug!(stage = %stage, "Request did not pass authorization");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// JSON 请求体
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

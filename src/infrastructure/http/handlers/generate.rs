//! Generate Video Handler
//!
//! POST / - 文本 → 解说视频

use axum::{extract::State, Json};
use std::sync::Arc;
use tracing::Instrument;
use uuid::Uuid;

use crate::infrastructure::http::dto::{ApiResponse, GenerateVideoData, GenerateVideoRequest};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::extract::{ApiJson, Authorized};
use crate::infrastructure::http::state::AppState;

/// 生成解说视频
///
/// 鉴权失败时不会解析请求体，也不会调用任何下游服务
pub async fn generate_video(
    State(state): State<Arc<AppState>>,
    Authorized(progress): Authorized,
    ApiJson(request): ApiJson<GenerateVideoRequest>,
) -> Result<Json<ApiResponse<GenerateVideoData>>, ApiError> {
    let cmd = request.into_command()?;

    // 同一 useduuid 可能被重复提交，request_id 用于区分日志
    let span = tracing::info_span!(
        "generate_video",
        request_id = %Uuid::new_v4(),
        artifact_id = %cmd.artifact_id
    );

    let response = state
        .generate_video_handler
        .handle(cmd, progress)
        .instrument(span)
        .await?;
    Ok(Json(ApiResponse::success(response.into())))
}

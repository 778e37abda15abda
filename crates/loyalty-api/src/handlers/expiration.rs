//! 积分到期提醒 API 处理器

use axum::{Json, extract::State};
use validator::Validate;

use loyalty_engine::dto::ExpirationCheckResult;

use crate::{
    dto::{ApiResponse, UserRequest},
    error::ApiError,
    state::AppState,
};

/// 检查并发送到期提醒
///
/// POST /api/loyalty/notify-expiration
pub async fn notify_expiration(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<Json<ApiResponse<ExpirationCheckResult>>, ApiError> {
    req.validate()?;

    let result = state
        .engine
        .expiration
        .notify_expiration(&req.user_id)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

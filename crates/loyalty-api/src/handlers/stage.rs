//! 会员阶段 API 处理器

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use loyalty_engine::dto::{StageUpdateResult, StageView};

use crate::{
    dto::{ApiResponse, UserQuery, UserRequest},
    error::ApiError,
    state::AppState,
};

/// 查询会员阶段
///
/// GET /api/loyalty/stage?userId=
pub async fn get_stage(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<StageView>>, ApiError> {
    query.validate()?;

    let view = state.engine.stages.get_stage(&query.user_id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// 重算会员阶段
///
/// POST /api/loyalty/stage/recompute
pub async fn recompute_stage(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<Json<ApiResponse<StageUpdateResult>>, ApiError> {
    req.validate()?;

    let result = state.engine.stages.update_stage(&req.user_id).await?;
    Ok(Json(ApiResponse::success(result)))
}

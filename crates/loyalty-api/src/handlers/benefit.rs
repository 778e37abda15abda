//! 权益 API 处理器

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use loyalty_engine::Benefit;
use loyalty_engine::dto::BenefitApplicationResult;

use crate::{
    dto::{ApiResponse, UserRequest},
    error::ApiError,
    state::AppState,
};

/// 查询权益目录
///
/// GET /api/loyalty/benefits
pub async fn list_benefits(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Benefit>>>, ApiError> {
    let benefits = state.engine.benefits.list_benefits().await?;
    Ok(Json(ApiResponse::success(benefits)))
}

/// 使用权益
///
/// POST /api/loyalty/benefits/{benefitId}/apply
pub async fn apply_benefit(
    State(state): State<AppState>,
    Path(benefit_id): Path<i64>,
    Json(req): Json<UserRequest>,
) -> Result<Json<ApiResponse<BenefitApplicationResult>>, ApiError> {
    req.validate()?;

    let result = state
        .engine
        .benefits
        .apply_benefit(&req.user_id, benefit_id)
        .await?;

    let message = if result.newly_applied {
        "权益使用成功"
    } else {
        "权益已使用过"
    };
    Ok(Json(ApiResponse::success_with_message(result, message)))
}

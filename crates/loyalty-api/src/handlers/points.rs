//! 积分 API 处理器
//!
//! 余额查询、流水查询、消费返积分和积分抵扣

use axum::{
    Json,
    extract::{Query, State},
};
use validator::Validate;

use loyalty_engine::dto::{AccrualResult, BalanceDto, LedgerEntryDto, RedemptionResult};

use crate::{
    dto::{ApiResponse, HistoryQuery, PurchaseRequest, UsePointsRequest, UserQuery},
    error::ApiError,
    state::AppState,
};

/// 查询可用积分
///
/// GET /api/loyalty/points/balance?userId=
pub async fn get_balance(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ApiResponse<BalanceDto>>, ApiError> {
    query.validate()?;

    let balance = state
        .engine
        .points
        .get_available_points(&query.user_id)
        .await?;

    Ok(Json(ApiResponse::success(BalanceDto {
        user_id: query.user_id,
        balance,
    })))
}

/// 查询积分流水
///
/// GET /api/loyalty/points/history?userId=&limit=
pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<LedgerEntryDto>>>, ApiError> {
    query.validate()?;

    let entries = state
        .engine
        .points
        .get_point_history(&query.user_id, query.limit)
        .await?;

    Ok(Json(ApiResponse::success(entries)))
}

/// 消费返积分
///
/// POST /api/loyalty/points/accrue
pub async fn accrue_points(
    State(state): State<AppState>,
    Json(req): Json<PurchaseRequest>,
) -> Result<Json<ApiResponse<AccrualResult>>, ApiError> {
    req.validate()?;

    let result = state
        .engine
        .points
        .add_points(&req.user_id, req.purchase_amount)
        .await?;

    Ok(Json(ApiResponse::success(result)))
}

/// 积分抵扣
///
/// POST /api/loyalty/points/use
pub async fn use_points(
    State(state): State<AppState>,
    Json(req): Json<UsePointsRequest>,
) -> Result<Json<ApiResponse<RedemptionResult>>, ApiError> {
    req.validate()?;

    let result = state
        .engine
        .points
        .use_points(&req.user_id, req.points)
        .await?;

    Ok(Json(ApiResponse::success_with_message(result, "积分抵扣成功")))
}

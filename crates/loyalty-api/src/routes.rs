//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use std::time::Duration;

use axum::{
    Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use tower_http::timeout::TimeoutLayer;

use loyalty_shared::{config::ServerConfig, observability::middleware as obs_middleware};

use crate::{handlers, state::AppState};

/// 积分路由
fn points_routes() -> Router<AppState> {
    Router::new()
        .route("/points/balance", get(handlers::points::get_balance))
        .route("/points/history", get(handlers::points::get_history))
        .route("/points/accrue", post(handlers::points::accrue_points))
        .route("/points/use", post(handlers::points::use_points))
}

/// 会员阶段路由
fn stage_routes() -> Router<AppState> {
    Router::new()
        .route("/stage", get(handlers::stage::get_stage))
        .route("/stage/recompute", post(handlers::stage::recompute_stage))
}

/// 权益与到期提醒路由
fn benefit_routes() -> Router<AppState> {
    Router::new()
        .route("/benefits", get(handlers::benefit::list_benefits))
        .route(
            "/benefits/{benefit_id}/apply",
            post(handlers::benefit::apply_benefit),
        )
        .route(
            "/notify-expiration",
            post(handlers::expiration::notify_expiration),
        )
}

/// 构建积分 API 路由（不含前缀）
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(points_routes())
        .merge(stage_routes())
        .merge(benefit_routes())
}

/// 构建完整应用
///
/// 挂载业务路由和探针，并附加请求追踪与 request id 中间件。
/// CORS 与超时在 main.rs 中按配置追加。
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/loyalty", api_routes())
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 请求超时层，超时返回 408
pub fn request_timeout_layer(config: &ServerConfig) -> TimeoutLayer {
    TimeoutLayer::with_status_code(
        StatusCode::REQUEST_TIMEOUT,
        Duration::from_secs(config.request_timeout_seconds),
    )
}

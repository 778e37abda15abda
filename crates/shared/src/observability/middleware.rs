//! HTTP 中间件
//!
//! `request_id` 负责生成或透传 `x-request-id`，`http_tracing` 为请求建立 span
//! 并按路由模板记录指标。两者同时使用时 `request_id` 需在外层。

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::{Instrument, info, info_span, warn};

use super::metrics;

static REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

/// 未命中任何路由时使用的指标标签
const UNMATCHED_ROUTE: &str = "unmatched";

/// 请求 ID，写入请求扩展供 handler 读取
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// HTTP 请求追踪和指标中间件
///
/// 指标的 path 标签取路由模板（如 `/benefits/{benefit_id}/apply`），
/// 避免路径参数放大标签基数。
pub async fn http_tracing(request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();

    let span = info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
        status = tracing::field::Empty,
        latency_ms = tracing::field::Empty,
    );

    let start = Instant::now();
    let response = next.run(request).instrument(span.clone()).await;
    let latency = start.elapsed();
    let status = response.status();

    span.record("status", status.as_u16());
    span.record("latency_ms", latency.as_millis() as u64);

    span.in_scope(|| {
        if status.is_server_error() {
            warn!(status = status.as_u16(), "请求处理失败");
        } else {
            info!(status = status.as_u16(), "请求完成");
        }
    });

    metrics::record_http_request(&method, &route, status.as_u16(), latency.as_secs_f64());

    response
}

/// 请求 ID 中间件
///
/// 沿用调用方传入的 `x-request-id`，缺失或不可见时生成 UUID v4，并回写到响应头。
pub async fn request_id(mut request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get(&REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(String::from)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(REQUEST_ID_HEADER.clone(), value);
    }

    response
}

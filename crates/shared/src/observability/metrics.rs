//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{Matcher, PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// HTTP 延迟直方图分桶（秒）
const HTTP_LATENCY_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            HTTP_LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!("loyalty_points_accrued_total", "Points credited by purchases");
    metrics::describe_counter!("loyalty_points_redeemed_total", "Points debited by redemptions");
    metrics::describe_counter!(
        "loyalty_redemptions_total",
        "Point redemption attempts by outcome"
    );
    metrics::describe_counter!("loyalty_stage_changes_total", "Persisted stage transitions");
    metrics::describe_counter!(
        "loyalty_benefit_applications_total",
        "Benefit application attempts by outcome"
    );
    metrics::describe_counter!(
        "loyalty_expiration_checks_total",
        "Expiration notice decisions by outcome"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录消费返积分
#[inline]
pub fn record_points_accrued(points: i64) {
    metrics::counter!("loyalty_points_accrued_total").increment(points.max(0) as u64);
}

/// 记录积分使用结果
///
/// status 取值：success / insufficient_balance / invalid_amount / error
#[inline]
pub fn record_redemption(status: &str, points: i64) {
    metrics::counter!("loyalty_redemptions_total", "status" => status.to_string()).increment(1);
    if status == "success" {
        metrics::counter!("loyalty_points_redeemed_total").increment(points.max(0) as u64);
    }
}

/// 记录阶段变更
#[inline]
pub fn record_stage_change(from: &str, to: &str) {
    metrics::counter!(
        "loyalty_stage_changes_total",
        "from" => from.to_string(),
        "to" => to.to_string()
    )
    .increment(1);
}

/// 记录权益使用结果
#[inline]
pub fn record_benefit_application(status: &str) {
    metrics::counter!(
        "loyalty_benefit_applications_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录到期提醒判定
#[inline]
pub fn record_expiration_check(notified: bool) {
    metrics::counter!(
        "loyalty_expiration_checks_total",
        "notified" => notified.to_string()
    )
    .increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_functions_do_not_panic() {
        // 未安装 recorder 时记录操作应为空操作
        record_http_request("GET", "/api/loyalty/points/balance", 200, 0.01);
        record_points_accrued(100);
        record_points_accrued(-1);
        record_redemption("success", 50);
        record_redemption("insufficient_balance", 5000);
        record_stage_change("Bronze", "Silver");
        record_benefit_application("applied");
        record_expiration_check(true);
        record_expiration_check(false);
    }

    #[test]
    fn test_latency_buckets_ascending() {
        assert!(HTTP_LATENCY_BUCKETS.windows(2).all(|w| w[0] < w[1]));
    }
}

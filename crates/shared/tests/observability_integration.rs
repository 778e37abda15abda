//! 可观测性模块集成测试
//!
//! 测试 metrics 和 middleware 模块的核心功能。

mod metrics_tests {
    use loyalty_shared::observability::metrics::{
        record_benefit_application, record_expiration_check, record_http_request,
        record_points_accrued, record_redemption, record_stage_change,
    };

    #[test]
    fn test_record_http_request() {
        record_http_request("GET", "/api/loyalty/points/balance", 200, 0.05);
        record_http_request("POST", "/api/loyalty/points/use", 409, 0.02);
        record_http_request("POST", "/api/loyalty/benefits/1/apply", 422, 0.03);
        record_http_request("GET", "/api/loyalty/stage", 503, 0.25);
    }

    #[test]
    fn test_record_loyalty_events() {
        record_points_accrued(120);
        record_redemption("success", 100);
        record_redemption("insufficient_balance", 9999);
        record_stage_change("Silver", "Gold");
        record_stage_change("Gold", "Silver");
        record_benefit_application("ineligible_stage");
        record_expiration_check(false);
    }
}

mod middleware_tests {
    use axum::{Router, body::Body, http::Request, middleware, routing::get};
    use loyalty_shared::observability::middleware::{RequestId, http_tracing, request_id};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route(
                "/echo",
                get(|axum::Extension(id): axum::Extension<RequestId>| async move {
                    id.as_str().to_string()
                }),
            )
            .layer(middleware::from_fn(http_tracing))
            .layer(middleware::from_fn(request_id))
    }

    #[tokio::test]
    async fn test_request_id_is_propagated() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header("x-request-id", "req-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-123");
    }

    #[tokio::test]
    async fn test_request_id_is_generated() {
        let response = app()
            .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        tokio_test::assert_ok!(uuid::Uuid::parse_str(id));
    }

    #[tokio::test]
    async fn test_blank_request_id_is_replaced() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header("x-request-id", "  ")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let id = response.headers()["x-request-id"].to_str().unwrap();
        tokio_test::assert_ok!(uuid::Uuid::parse_str(id));
    }
}

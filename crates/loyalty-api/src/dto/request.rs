//! API 请求 DTO 定义
//!
//! 所有 REST API 的请求参数和请求体结构

use serde::Deserialize;
use validator::Validate;

/// 按用户查询
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    #[validate(length(min = 1, max = 128, message = "用户ID长度必须在1-128个字符之间"))]
    pub user_id: String,
}

/// 积分流水查询
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct HistoryQuery {
    #[validate(length(min = 1, max = 128, message = "用户ID长度必须在1-128个字符之间"))]
    pub user_id: String,
    /// 默认 50，超过 500 按 500 处理
    #[validate(range(min = 1, message = "limit 必须大于0"))]
    pub limit: Option<i64>,
}

/// 消费返积分请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    #[validate(length(min = 1, max = 128, message = "用户ID长度必须在1-128个字符之间"))]
    pub user_id: String,
    #[validate(range(min = 0.0, message = "消费金额不能为负数"))]
    pub purchase_amount: f64,
}

/// 积分抵扣请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UsePointsRequest {
    #[validate(length(min = 1, max = 128, message = "用户ID长度必须在1-128个字符之间"))]
    pub user_id: String,
    #[validate(range(min = 1, message = "抵扣积分必须大于0"))]
    pub points: i64,
}

/// 只携带用户 ID 的请求体（阶段重算、权益使用、到期提醒）
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    #[validate(length(min = 1, max = 128, message = "用户ID长度必须在1-128个字符之间"))]
    pub user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_use_points_request_validation() {
        let ok = UsePointsRequest {
            user_id: "user-1".to_string(),
            points: 10,
        };
        tokio_test::assert_ok!(ok.validate());

        let zero = UsePointsRequest {
            user_id: "user-1".to_string(),
            points: 0,
        };
        tokio_test::assert_err!(zero.validate());

        let no_user = UsePointsRequest {
            user_id: String::new(),
            points: 10,
        };
        tokio_test::assert_err!(no_user.validate());
    }

    #[test]
    fn test_purchase_request_validation() {
        let negative = PurchaseRequest {
            user_id: "user-1".to_string(),
            purchase_amount: -1.0,
        };
        tokio_test::assert_err!(negative.validate());

        let zero = PurchaseRequest {
            user_id: "user-1".to_string(),
            purchase_amount: 0.0,
        };
        tokio_test::assert_ok!(zero.validate());
    }

    #[test]
    fn test_history_query_deserialize() {
        let query: HistoryQuery =
            serde_json::from_str(r#"{"userId":"user-1","limit":20}"#).unwrap();
        assert_eq!(query.user_id, "user-1");
        assert_eq!(query.limit, Some(20));
        tokio_test::assert_ok!(query.validate());

        let query: HistoryQuery = serde_json::from_str(r#"{"userId":"user-1","limit":0}"#).unwrap();
        tokio_test::assert_err!(query.validate());
    }
}

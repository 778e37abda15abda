//! API 错误类型定义
//!
//! 将引擎错误映射为 HTTP 状态码和统一响应体

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use loyalty_engine::LoyaltyError;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    // 请求错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("无效的积分或金额: {0}")]
    InvalidAmount(String),

    // 资源不存在
    #[error("权益不存在: {0}")]
    BenefitNotFound(i64),

    // 状态冲突
    #[error("积分余额不足: 需要 {required}, 可用 {available}")]
    InsufficientBalance { required: i64, available: i64 },
    #[error("并发冲突，请重试")]
    ConcurrencyConflict(String),

    // 业务规则不满足
    #[error("当前阶段不满足权益条件: {stage}")]
    IneligibleStage { benefit_id: i64, stage: String },
    #[error("权益不在有效期内: {0}")]
    BenefitExpired(i64),

    // 系统错误
    #[error("存储不可用: {0}")]
    StoreUnavailable(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            Self::BenefitNotFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientBalance { .. } | Self::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            Self::IneligibleStage { .. } | Self::BenefitExpired(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BenefitNotFound(_) => "BENEFIT_NOT_FOUND",
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
            Self::IneligibleStage { .. } => "INELIGIBLE_STAGE",
            Self::BenefitExpired(_) => "BENEFIT_EXPIRED",
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 系统级错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::StoreUnavailable(e) => {
                tracing::error!(error = %e, "存储操作失败");
                "服务暂不可用，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            Self::ConcurrencyConflict(key) => {
                tracing::warn!(lock_key = %key, "用户锁等待超时");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从积分引擎错误转换
impl From<LoyaltyError> for ApiError {
    fn from(err: LoyaltyError) -> Self {
        match err {
            LoyaltyError::InsufficientBalance {
                required,
                available,
            } => Self::InsufficientBalance {
                required,
                available,
            },
            LoyaltyError::InvalidAmount(msg) => Self::InvalidAmount(msg),
            LoyaltyError::BenefitNotFound(id) => Self::BenefitNotFound(id),
            LoyaltyError::IneligibleStage { benefit_id, stage } => {
                Self::IneligibleStage { benefit_id, stage }
            }
            LoyaltyError::BenefitExpired(id) => Self::BenefitExpired(id),
            LoyaltyError::Database(e) => Self::StoreUnavailable(e.to_string()),
            LoyaltyError::StoreUnavailable(msg) => Self::StoreUnavailable(msg),
            LoyaltyError::Validation(msg) => Self::Validation(msg),
            LoyaltyError::ConcurrencyConflict(key) => Self::ConcurrencyConflict(key),
            LoyaltyError::Internal(msg) => Self::Internal(msg),
        }
    }
}

/// API 层 Result 类型别名
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LoyaltyError::Validation("blank".into()), StatusCode::BAD_REQUEST),
            (LoyaltyError::InvalidAmount("-1".into()), StatusCode::BAD_REQUEST),
            (LoyaltyError::BenefitNotFound(1), StatusCode::NOT_FOUND),
            (
                LoyaltyError::InsufficientBalance {
                    required: 10,
                    available: 1,
                },
                StatusCode::CONFLICT,
            ),
            (
                LoyaltyError::ConcurrencyConflict("points:u".into()),
                StatusCode::CONFLICT,
            ),
            (
                LoyaltyError::IneligibleStage {
                    benefit_id: 1,
                    stage: "Bronze".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (LoyaltyError::BenefitExpired(1), StatusCode::UNPROCESSABLE_ENTITY),
            (
                LoyaltyError::StoreUnavailable("ledger".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                LoyaltyError::Database(sqlx::Error::PoolTimedOut),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (LoyaltyError::Internal("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let code = err.error_code();
            let api: ApiError = err.into();
            assert_eq!(api.status_code(), expected);
            assert_eq!(api.error_code(), code);
        }
    }

    #[test]
    fn test_system_error_message_hidden() {
        let response =
            ApiError::StoreUnavailable("connection refused at 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}

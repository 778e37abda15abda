//! 积分服务错误类型
//!
//! 定义引擎层的业务错误和协作方（存储、通知）错误

use thiserror::Error;

/// 积分服务错误类型
#[derive(Debug, Error)]
pub enum LoyaltyError {
    // === 积分相关错误 ===
    #[error("积分余额不足: 需要 {required}, 可用 {available}")]
    InsufficientBalance { required: i64, available: i64 },

    #[error("无效的积分或金额: {0}")]
    InvalidAmount(String),

    // === 权益相关错误 ===
    #[error("权益不存在: {0}")]
    BenefitNotFound(i64),

    #[error("当前阶段不满足权益条件: benefit_id={benefit_id}, stage={stage}")]
    IneligibleStage { benefit_id: i64, stage: String },

    #[error("权益不在有效期内: {0}")]
    BenefitExpired(i64),

    // === 协作方错误 ===
    #[error("数据库错误: {0}")]
    Database(#[from] sqlx::Error),

    #[error("外部依赖不可用: {0}")]
    StoreUnavailable(String),

    // === 系统错误 ===
    #[error("参数校验失败: {0}")]
    Validation(String),

    #[error("并发冲突，请重试: {0}")]
    ConcurrencyConflict(String),

    #[error("内部错误: {0}")]
    Internal(String),
}

/// 积分服务 Result 类型别名
pub type Result<T> = std::result::Result<T, LoyaltyError>;

impl LoyaltyError {
    /// 检查是否为可重试的错误
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Database(_) | Self::StoreUnavailable(_) | Self::ConcurrencyConflict(_)
        )
    }

    /// 检查是否为业务错误（非系统错误）
    pub fn is_business_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_)
                | Self::StoreUnavailable(_)
                | Self::ConcurrencyConflict(_)
                | Self::Internal(_)
        )
    }

    /// 是否为存储或通知等协作方故障
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::StoreUnavailable(_))
    }

    /// 获取错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientBalance { .. } => "INSUFFICIENT_BALANCE",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::BenefitNotFound(_) => "BENEFIT_NOT_FOUND",
            Self::IneligibleStage { .. } => "INELIGIBLE_STAGE",
            Self::BenefitExpired(_) => "BENEFIT_EXPIRED",
            Self::Database(_) | Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::ConcurrencyConflict(_) => "CONCURRENCY_CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

/// 校验用户 ID 非空
pub(crate) fn ensure_user_id(user_id: &str) -> Result<()> {
    if user_id.trim().is_empty() {
        return Err(LoyaltyError::Validation("user_id 不能为空".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_retryable() {
        assert!(LoyaltyError::ConcurrencyConflict("points:u1".to_string()).is_retryable());
        assert!(LoyaltyError::StoreUnavailable("ledger".to_string()).is_retryable());
        assert!(LoyaltyError::Database(sqlx::Error::PoolTimedOut).is_retryable());
        assert!(!LoyaltyError::BenefitNotFound(1).is_retryable());
        assert!(
            !LoyaltyError::InsufficientBalance {
                required: 5,
                available: 3
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_error_is_business_error() {
        assert!(LoyaltyError::BenefitExpired(1).is_business_error());
        assert!(LoyaltyError::InvalidAmount("-1".to_string()).is_business_error());
        assert!(
            LoyaltyError::IneligibleStage {
                benefit_id: 1,
                stage: "Bronze".to_string()
            }
            .is_business_error()
        );
        assert!(!LoyaltyError::Internal("boom".to_string()).is_business_error());
        assert!(!LoyaltyError::StoreUnavailable("ledger".to_string()).is_business_error());
    }

    #[test]
    fn test_store_failures_share_error_code() {
        let db = LoyaltyError::Database(sqlx::Error::PoolTimedOut);
        let store = LoyaltyError::StoreUnavailable("notifier".to_string());

        assert!(db.is_store_failure());
        assert!(store.is_store_failure());
        assert_eq!(db.error_code(), "STORE_UNAVAILABLE");
        assert_eq!(store.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_error_code() {
        assert_eq!(
            LoyaltyError::InsufficientBalance {
                required: 5,
                available: 3
            }
            .error_code(),
            "INSUFFICIENT_BALANCE"
        );
        assert_eq!(LoyaltyError::BenefitNotFound(9).error_code(), "BENEFIT_NOT_FOUND");
        assert_eq!(LoyaltyError::BenefitExpired(9).error_code(), "BENEFIT_EXPIRED");
        assert_eq!(
            LoyaltyError::ConcurrencyConflict("stage:u1".to_string()).error_code(),
            "CONCURRENCY_CONFLICT"
        );
    }

    #[test]
    fn test_error_display() {
        let err = LoyaltyError::InsufficientBalance {
            required: 500,
            available: 120,
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("120"));

        let err = LoyaltyError::IneligibleStage {
            benefit_id: 7,
            stage: "Silver".to_string(),
        };
        assert!(err.to_string().contains("Silver"));
    }

    #[test]
    fn test_ensure_user_id() {
        assert!(ensure_user_id("user-1").is_ok());
        assert!(matches!(
            ensure_user_id("   "),
            Err(LoyaltyError::Validation(_))
        ));
    }
}

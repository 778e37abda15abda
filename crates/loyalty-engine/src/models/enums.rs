//! 积分服务枚举类型定义
//!
//! 所有枚举都支持数据库（sqlx）和 JSON（serde）序列化

use serde::{Deserialize, Serialize};

/// 账本流水原因
///
/// 每一条积分变动都必须带有原因，便于审计追溯
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "varchar", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LedgerReason {
    /// 消费返积分
    PurchaseAccrual,
    /// 积分抵扣
    PointRedemption,
}

impl LedgerReason {
    /// 流水原因的可读标签
    pub fn label(&self) -> &'static str {
        match self {
            Self::PurchaseAccrual => "purchase accrual",
            Self::PointRedemption => "point redemption",
        }
    }

    /// 该原因产生的流水方向（+1 入账 / -1 出账）
    pub fn sign(&self) -> i64 {
        match self {
            Self::PurchaseAccrual => 1,
            Self::PointRedemption => -1,
        }
    }
}

impl std::fmt::Display for LedgerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

//! 权益相关实体定义
//!
//! 权益由运营后台维护，本服务只读取定义并记录使用事实

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loyalty_shared::config::BenefitSeedConfig;

/// 权益定义
///
/// 按会员阶段开放，且只在 [valid_from, valid_until) 内有效
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Benefit {
    pub id: i64,
    /// 权益内容（如 "全场九折"、"免运费"）
    pub description: String,
    /// 可使用该权益的阶段标签
    pub eligible_stages: Vec<String>,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Benefit {
    /// 检查权益在指定时间是否有效
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now < self.valid_until
    }

    /// 检查阶段是否可使用该权益
    pub fn is_eligible_stage(&self, stage: &str) -> bool {
        self.eligible_stages.iter().any(|s| s == stage)
    }

    /// 由预置配置构造（内存后端）
    pub fn from_seed(seed: &BenefitSeedConfig, created_at: DateTime<Utc>) -> Self {
        Self {
            id: seed.id,
            description: seed.description.clone(),
            eligible_stages: seed.eligible_stages.clone(),
            valid_from: seed.valid_from,
            valid_until: seed.valid_until,
            created_at,
        }
    }
}

/// 权益使用记录
///
/// 每个 (用户, 权益) 至多一条
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BenefitApplication {
    pub benefit_id: i64,
    pub user_id: String,
    pub applied_at: DateTime<Utc>,
}

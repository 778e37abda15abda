//! 会员阶段相关实体定义
//!
//! 阶段由积分余额按阶梯表映射得到，阶梯表是有序的 (阈值, 标签) 列表，
//! 新增阶段只需增加配置项，不需要新增分支逻辑。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use loyalty_shared::config::StageTierConfig;

use crate::error::{LoyaltyError, Result};

/// 用户当前阶段记录
///
/// 每个用户至多一条，阶段变化时原地更新
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct StageRecord {
    /// 用户 ID
    pub user_id: String,
    /// 阶段标签
    pub stage: String,
    /// 当前阶段的进入阈值
    pub promotion_threshold: i64,
    /// 首次评定阶段的时间
    pub applied_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StageRecord {
    /// 为尚无阶段记录的用户创建记录
    pub fn new(user_id: impl Into<String>, tier: &StageTier, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            stage: tier.label.clone(),
            promotion_threshold: tier.threshold,
            applied_at: now,
            updated_at: now,
        }
    }

    /// 切换到新阶段，刷新更新时间
    pub fn transition_to(&mut self, tier: &StageTier, now: DateTime<Utc>) {
        self.stage = tier.label.clone();
        self.promotion_threshold = tier.threshold;
        self.updated_at = now;
    }
}

/// 阶梯中的一级
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTier {
    pub label: String,
    /// 进入该阶段所需的最低余额（含）
    pub threshold: i64,
}

impl StageTier {
    pub fn new(label: impl Into<String>, threshold: i64) -> Self {
        Self {
            label: label.into(),
            threshold,
        }
    }
}

/// 阶段阶梯
///
/// 阈值严格升序；余额落在某一级阈值（含）与下一级阈值（不含）之间即属于该级，
/// 低于最低阈值的余额归入最低一级。无滞回：余额跨过阈值立即升降。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLadder {
    tiers: Vec<StageTier>,
}

impl StageLadder {
    /// 校验并构造阶梯
    pub fn new(tiers: Vec<StageTier>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(LoyaltyError::Validation("阶段阶梯不能为空".to_string()));
        }

        for tier in &tiers {
            if tier.label.trim().is_empty() {
                return Err(LoyaltyError::Validation("阶段标签不能为空".to_string()));
            }
        }

        for pair in tiers.windows(2) {
            if pair[1].threshold <= pair[0].threshold {
                return Err(LoyaltyError::Validation(format!(
                    "阶段阈值必须严格升序: {}({}) -> {}({})",
                    pair[0].label, pair[0].threshold, pair[1].label, pair[1].threshold
                )));
            }
        }

        let mut labels: Vec<&str> = tiers.iter().map(|t| t.label.as_str()).collect();
        labels.sort_unstable();
        if labels.windows(2).any(|w| w[0] == w[1]) {
            return Err(LoyaltyError::Validation("阶段标签重复".to_string()));
        }

        Ok(Self { tiers })
    }

    /// 从配置构造
    pub fn from_config(tiers: &[StageTierConfig]) -> Result<Self> {
        Self::new(
            tiers
                .iter()
                .map(|t| StageTier::new(t.label.clone(), t.threshold))
                .collect(),
        )
    }

    /// 根据余额确定阶段
    pub fn classify(&self, balance: i64) -> &StageTier {
        self.tiers
            .iter()
            .rev()
            .find(|tier| balance >= tier.threshold)
            .unwrap_or_else(|| self.lowest())
    }

    /// 最低一级（新用户的默认阶段）
    pub fn lowest(&self) -> &StageTier {
        &self.tiers[0]
    }

    /// 按标签查找阶段
    pub fn tier(&self, label: &str) -> Option<&StageTier> {
        self.tiers.iter().find(|t| t.label == label)
    }

    /// 阈值高于给定阈值的第一级
    pub fn next_after(&self, threshold: i64) -> Option<&StageTier> {
        self.tiers.iter().find(|tier| tier.threshold > threshold)
    }

    pub fn tiers(&self) -> &[StageTier] {
        &self.tiers
    }
}

impl Default for StageLadder {
    fn default() -> Self {
        Self {
            tiers: vec![
                StageTier::new("Bronze", 0),
                StageTier::new("Silver", 500),
                StageTier::new("Gold", 1000),
            ],
        }
    }
}

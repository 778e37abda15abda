//! 服务层数据传输对象
//!
//! 定义服务层与外部交互使用的 DTO，与内部领域模型解耦

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{LedgerEntry, LedgerReason, StageLadder, StageRecord};
use crate::notification::ExpirationNotice;

/// 余额 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDto {
    pub user_id: String,
    pub balance: i64,
}

/// 积分流水 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryDto {
    pub id: i64,
    pub delta: i64,
    pub entry_date: NaiveDate,
    pub reason: LedgerReason,
    /// 可读的原因标签
    pub reason_label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<LedgerEntry> for LedgerEntryDto {
    fn from(entry: LedgerEntry) -> Self {
        Self {
            id: entry.id,
            delta: entry.delta,
            entry_date: entry.entry_date,
            reason_label: entry.reason.label().to_string(),
            reason: entry.reason,
            expires_at: entry.expires_at,
            created_at: entry.created_at,
        }
    }
}

/// 消费返积分结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccrualResult {
    pub user_id: String,
    pub points_earned: i64,
    /// 返积分为 0 时不产生流水
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

/// 积分抵扣结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionResult {
    pub user_id: String,
    pub points_used: i64,
    pub balance_after: i64,
    pub entry_id: i64,
}

/// 会员阶段视图
///
/// 用户尚未评定过阶段时展示最低阶段，persisted 为 false
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageView {
    pub user_id: String,
    pub stage: String,
    pub promotion_threshold: i64,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub balance: i64,
    /// 按当前余额应处的阶段，与 stage 不同时表示尚未重算
    pub balance_stage: String,
    /// stage 的下一阶段（已是最高阶段时为空）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<String>,
    /// 距下一阶段还差的积分，余额已达标时为 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points_to_next_stage: Option<i64>,
}

impl StageView {
    /// 组装阶段视图
    ///
    /// 无阶段记录时展示最低一级；升级进度相对展示的阶段计算
    pub fn build(
        user_id: &str,
        record: Option<StageRecord>,
        balance: i64,
        ladder: &StageLadder,
    ) -> Self {
        let (stage, promotion_threshold, applied_at, updated_at) = match record {
            Some(r) => (
                r.stage,
                r.promotion_threshold,
                Some(r.applied_at),
                Some(r.updated_at),
            ),
            None => {
                let lowest = ladder.lowest();
                (lowest.label.clone(), lowest.threshold, None, None)
            }
        };
        let persisted = applied_at.is_some();
        let next = ladder.next_after(promotion_threshold);

        Self {
            user_id: user_id.to_string(),
            stage,
            promotion_threshold,
            persisted,
            applied_at,
            updated_at,
            balance,
            balance_stage: ladder.classify(balance).label.clone(),
            next_stage: next.map(|t| t.label.clone()),
            points_to_next_stage: next.map(|t| t.threshold.saturating_sub(balance).max(0)),
        }
    }
}

/// 阶段重算结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageUpdateResult {
    pub user_id: String,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_stage: Option<String>,
    pub balance: i64,
    /// 本次是否写入了阶段记录
    pub changed: bool,
}

/// 权益使用结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenefitApplicationResult {
    pub benefit_id: i64,
    pub user_id: String,
    pub stage: String,
    /// false 表示此前已使用过，本次未重复记录
    pub newly_applied: bool,
}

/// 到期提醒结果
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationCheckResult {
    pub user_id: String,
    pub will_notify: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<ExpirationNotice>,
}

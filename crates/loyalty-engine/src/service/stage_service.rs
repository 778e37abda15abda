//! 会员阶段服务
//!
//! 阶段由余额按阶梯表映射，只在标签变化时写入阶段记录。

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use loyalty_shared::observability::metrics as loyalty_metrics;

use crate::error::{Result, ensure_user_id};
use crate::lock::LockManager;
use crate::models::StageRecord;
use crate::policy::LoyaltyPolicy;
use crate::repository::{LedgerRepositoryTrait, StageRepositoryTrait};
use crate::service::dto::{StageUpdateResult, StageView};

/// 会员阶段服务
pub struct StageService {
    ledger: Arc<dyn LedgerRepositoryTrait>,
    stages: Arc<dyn StageRepositoryTrait>,
    locks: LockManager,
    policy: Arc<LoyaltyPolicy>,
}

impl StageService {
    pub fn new(
        ledger: Arc<dyn LedgerRepositoryTrait>,
        stages: Arc<dyn StageRepositoryTrait>,
        locks: LockManager,
        policy: Arc<LoyaltyPolicy>,
    ) -> Self {
        Self {
            ledger,
            stages,
            locks,
            policy,
        }
    }

    /// 查询当前阶段及升级进度
    ///
    /// 只读，不会为新用户创建阶段记录
    #[instrument(skip(self))]
    pub async fn get_stage(&self, user_id: &str) -> Result<StageView> {
        ensure_user_id(user_id)?;

        let record = self.stages.get(user_id).await?;
        let balance = self.ledger.sum_deltas(user_id).await?;

        Ok(StageView::build(user_id, record, balance, &self.policy.ladder))
    }

    /// 按当前余额重算阶段
    ///
    /// 幂等：余额不变时重复调用不会产生写入
    #[instrument(skip(self))]
    pub async fn update_stage(&self, user_id: &str) -> Result<StageUpdateResult> {
        ensure_user_id(user_id)?;

        let _guard = self.locks.acquire(&LockManager::stage_key(user_id)).await?;

        let existing = self.stages.get(user_id).await?;
        let balance = self.ledger.sum_deltas(user_id).await?;
        let tier = self.policy.ladder.classify(balance);
        let now = Utc::now();

        match existing {
            None => {
                let record = StageRecord::new(user_id, tier, now);
                self.stages.upsert(&record).await?;

                info!(
                    user_id = %user_id,
                    stage = %record.stage,
                    balance,
                    "首次评定会员阶段"
                );

                Ok(StageUpdateResult {
                    user_id: user_id.to_string(),
                    stage: record.stage,
                    previous_stage: None,
                    balance,
                    changed: true,
                })
            }
            Some(mut record) if record.stage != tier.label => {
                let previous = record.stage.clone();
                record.transition_to(tier, now);
                self.stages.upsert(&record).await?;

                loyalty_metrics::record_stage_change(&previous, &record.stage);
                info!(
                    user_id = %user_id,
                    from = %previous,
                    to = %record.stage,
                    balance,
                    "会员阶段变更"
                );

                Ok(StageUpdateResult {
                    user_id: user_id.to_string(),
                    stage: record.stage,
                    previous_stage: Some(previous),
                    balance,
                    changed: true,
                })
            }
            Some(record) => {
                debug!(user_id = %user_id, stage = %record.stage, balance, "会员阶段未变化");

                Ok(StageUpdateResult {
                    user_id: user_id.to_string(),
                    previous_stage: Some(record.stage.clone()),
                    stage: record.stage,
                    balance,
                    changed: false,
                })
            }
        }
    }
}

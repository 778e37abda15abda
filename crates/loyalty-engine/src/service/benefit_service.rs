//! 权益服务
//!
//! 权益按会员阶段开放、按时间窗口生效。
//!
//! ## 使用校验顺序
//!
//! 1. 权益存在 -> 2. 在有效期内 -> 3. 当前阶段在可用阶段内 -> 4. 记录使用

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use loyalty_shared::observability::metrics as loyalty_metrics;

use crate::error::{LoyaltyError, Result, ensure_user_id};
use crate::models::Benefit;
use crate::policy::LoyaltyPolicy;
use crate::repository::{BenefitRepositoryTrait, StageRepositoryTrait};
use crate::service::dto::BenefitApplicationResult;

/// 权益服务
pub struct BenefitService {
    benefits: Arc<dyn BenefitRepositoryTrait>,
    stages: Arc<dyn StageRepositoryTrait>,
    policy: Arc<LoyaltyPolicy>,
}

impl BenefitService {
    pub fn new(
        benefits: Arc<dyn BenefitRepositoryTrait>,
        stages: Arc<dyn StageRepositoryTrait>,
        policy: Arc<LoyaltyPolicy>,
    ) -> Self {
        Self {
            benefits,
            stages,
            policy,
        }
    }

    /// 列出权益目录
    #[instrument(skip(self))]
    pub async fn list_benefits(&self) -> Result<Vec<Benefit>> {
        self.benefits.list_all().await
    }

    /// 使用权益
    ///
    /// 同一用户重复使用同一权益不会重复记录，返回 newly_applied = false
    #[instrument(skip(self))]
    pub async fn apply_benefit(
        &self,
        user_id: &str,
        benefit_id: i64,
    ) -> Result<BenefitApplicationResult> {
        ensure_user_id(user_id)?;

        let benefit = self
            .benefits
            .get(benefit_id)
            .await?
            .ok_or(LoyaltyError::BenefitNotFound(benefit_id))?;

        if !benefit.is_active(Utc::now()) {
            loyalty_metrics::record_benefit_application("expired");
            warn!(
                user_id = %user_id,
                benefit_id,
                valid_from = %benefit.valid_from,
                valid_until = %benefit.valid_until,
                "权益不在有效期内"
            );
            return Err(LoyaltyError::BenefitExpired(benefit_id));
        }

        let stage = self.current_stage(user_id).await?;
        if !benefit.is_eligible_stage(&stage) {
            loyalty_metrics::record_benefit_application("ineligible");
            warn!(user_id = %user_id, benefit_id, stage = %stage, "当前阶段不可使用该权益");
            return Err(LoyaltyError::IneligibleStage { benefit_id, stage });
        }

        let newly_applied = self.benefits.record_application(benefit_id, user_id).await?;

        if newly_applied {
            loyalty_metrics::record_benefit_application("applied");
            info!(user_id = %user_id, benefit_id, stage = %stage, "权益使用成功");
        } else {
            loyalty_metrics::record_benefit_application("already_applied");
            info!(user_id = %user_id, benefit_id, "权益已使用过，忽略重复请求");
        }

        Ok(BenefitApplicationResult {
            benefit_id,
            user_id: user_id.to_string(),
            stage,
            newly_applied,
        })
    }

    /// 用户当前阶段，无记录时为最低阶段
    async fn current_stage(&self, user_id: &str) -> Result<String> {
        Ok(self
            .stages
            .get(user_id)
            .await?
            .map(|r| r.stage)
            .unwrap_or_else(|| self.policy.ladder.lowest().label.clone()))
    }
}

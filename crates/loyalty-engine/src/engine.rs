//! 引擎装配
//!
//! 将仓储、用户锁、通知和策略组装为各业务服务

use std::sync::Arc;

use crate::lock::LockManager;
use crate::notification::Notifier;
use crate::policy::LoyaltyPolicy;
use crate::repository::{BenefitRepositoryTrait, LedgerRepositoryTrait, StageRepositoryTrait};
use crate::service::{BenefitService, ExpirationService, PointsService, StageService};

/// 引擎依赖的存储
#[derive(Clone)]
pub struct Stores {
    pub ledger: Arc<dyn LedgerRepositoryTrait>,
    pub stages: Arc<dyn StageRepositoryTrait>,
    pub benefits: Arc<dyn BenefitRepositoryTrait>,
}

/// 积分引擎
///
/// 积分和阶段服务共享同一个锁管理器
#[derive(Clone)]
pub struct LoyaltyEngine {
    pub points: Arc<PointsService>,
    pub stages: Arc<StageService>,
    pub benefits: Arc<BenefitService>,
    pub expiration: Arc<ExpirationService>,
}

impl LoyaltyEngine {
    pub fn new(
        stores: Stores,
        notifier: Arc<dyn Notifier>,
        locks: LockManager,
        policy: LoyaltyPolicy,
    ) -> Self {
        let policy = Arc::new(policy);

        Self {
            points: Arc::new(PointsService::new(
                stores.ledger.clone(),
                locks.clone(),
                policy.clone(),
            )),
            stages: Arc::new(StageService::new(
                stores.ledger.clone(),
                stores.stages.clone(),
                locks,
                policy.clone(),
            )),
            benefits: Arc::new(BenefitService::new(
                stores.benefits,
                stores.stages,
                policy.clone(),
            )),
            expiration: Arc::new(ExpirationService::new(stores.ledger, notifier, policy)),
        }
    }
}

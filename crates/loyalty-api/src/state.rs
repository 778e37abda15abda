//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态，以及按配置装配存储后端

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use loyalty_engine::{
    Benefit, BenefitRepository, LedgerRepository, LockManager, LoyaltyEngine, LoyaltyPolicy,
    MemoryBenefitRepository, MemoryLedgerRepository, MemoryStageRepository, StageRepository,
    Stores, build_notifier,
};
use loyalty_shared::config::{AppConfig, StorageBackend, StorageConfig};
use loyalty_shared::database::Database;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 积分引擎
    pub engine: LoyaltyEngine,
    /// PostgreSQL 连接（内存后端时为空）
    pub database: Option<Database>,
}

impl AppState {
    pub fn new(engine: LoyaltyEngine) -> Self {
        Self {
            engine,
            database: None,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// 按配置装配存储、通知和策略
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let policy = LoyaltyPolicy::from_config(&config.policy)?;
        let notifier = build_notifier(&config.notifier)?;
        let locks = LockManager::from_config(&config.lock);

        match config.storage.backend {
            StorageBackend::Memory => {
                if config.is_production() {
                    tracing::warn!("生产环境使用内存存储，数据不会持久化");
                }
                let stores = memory_stores(&config.storage);
                info!(
                    seeded_benefits = config.storage.seed_benefits.len(),
                    "Using in-memory storage backend"
                );
                Ok(Self::new(LoyaltyEngine::new(stores, notifier, locks, policy)))
            }
            StorageBackend::Postgres => {
                let database = Database::connect(&config.database).await?;
                let pool = database.pool().clone();
                let stores = Stores {
                    ledger: Arc::new(LedgerRepository::new(pool.clone())),
                    stages: Arc::new(StageRepository::new(pool.clone())),
                    benefits: Arc::new(BenefitRepository::new(pool)),
                };
                info!("Using PostgreSQL storage backend");
                Ok(Self::new(LoyaltyEngine::new(stores, notifier, locks, policy))
                    .with_database(database))
            }
        }
    }

    /// 存储是否可用
    pub async fn store_ready(&self) -> bool {
        match &self.database {
            Some(db) => db.health_check().await.is_ok(),
            None => true,
        }
    }
}

/// 创建内存存储并写入预置权益
fn memory_stores(storage: &StorageConfig) -> Stores {
    let benefits = MemoryBenefitRepository::new();
    let now = Utc::now();
    for seed in &storage.seed_benefits {
        benefits.insert_benefit(Benefit::from_seed(seed, now));
    }

    Stores {
        ledger: Arc::new(MemoryLedgerRepository::new()),
        stages: Arc::new(MemoryStageRepository::new()),
        benefits: Arc::new(benefits),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loyalty_shared::config::BenefitSeedConfig;

    #[tokio::test]
    async fn test_memory_state_from_default_config() {
        let state = AppState::from_config(&AppConfig::default()).await.unwrap();

        assert!(state.database.is_none());
        assert!(state.store_ready().await);
        assert!(state.engine.benefits.list_benefits().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_memory_state_seeds_benefits() {
        let mut config = AppConfig::default();
        config.storage.seed_benefits = vec![BenefitSeedConfig {
            id: 7,
            description: "生日礼包".to_string(),
            eligible_stages: vec!["Gold".to_string()],
            valid_from: Utc::now() - chrono::Duration::days(1),
            valid_until: Utc::now() + chrono::Duration::days(1),
        }];

        let state = AppState::from_config(&config).await.unwrap();
        let benefits = state.engine.benefits.list_benefits().await.unwrap();

        assert_eq!(benefits.len(), 1);
        assert_eq!(benefits[0].id, 7);
    }

    #[tokio::test]
    async fn test_invalid_policy_rejected() {
        let mut config = AppConfig::default();
        config.policy.stages.clear();

        assert!(AppState::from_config(&config).await.is_err());
    }
}

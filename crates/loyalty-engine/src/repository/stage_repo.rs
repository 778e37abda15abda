//! 会员阶段仓储

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::StageRepositoryTrait;
use crate::error::Result;
use crate::models::StageRecord;

/// 会员阶段仓储（PostgreSQL）
///
/// user_id 唯一约束保证每个用户至多一条阶段记录
pub struct StageRepository {
    pool: PgPool,
}

impl StageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<StageRecord>> {
        let record = sqlx::query_as::<_, StageRecord>(
            r#"
            SELECT user_id, stage, promotion_threshold, applied_at, updated_at
            FROM loyalty_stages
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// 插入或更新阶段记录
    ///
    /// applied_at 只在首次插入时写入
    pub async fn upsert(&self, record: &StageRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO loyalty_stages (user_id, stage, promotion_threshold, applied_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id) DO UPDATE SET
                stage = EXCLUDED.stage,
                promotion_threshold = EXCLUDED.promotion_threshold,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&record.user_id)
        .bind(&record.stage)
        .bind(record.promotion_threshold)
        .bind(record.applied_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl StageRepositoryTrait for StageRepository {
    async fn get(&self, user_id: &str) -> Result<Option<StageRecord>> {
        self.get(user_id).await
    }

    async fn upsert(&self, record: &StageRecord) -> Result<()> {
        self.upsert(record).await
    }
}

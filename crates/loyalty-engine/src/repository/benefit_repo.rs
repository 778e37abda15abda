//! 权益目录仓储
//!
//! 权益定义只读，使用记录按 (benefit_id, user_id) 唯一

use async_trait::async_trait;
use sqlx::PgPool;

use super::traits::BenefitRepositoryTrait;
use crate::error::Result;
use crate::models::Benefit;

/// 权益目录仓储（PostgreSQL）
pub struct BenefitRepository {
    pool: PgPool,
}

impl BenefitRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get(&self, id: i64) -> Result<Option<Benefit>> {
        let benefit = sqlx::query_as::<_, Benefit>(
            r#"
            SELECT id, description, eligible_stages, valid_from, valid_until, created_at
            FROM loyalty_benefits
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(benefit)
    }

    /// 列出当前有效的权益
    pub async fn list_all(&self) -> Result<Vec<Benefit>> {
        let benefits = sqlx::query_as::<_, Benefit>(
            r#"
            SELECT id, description, eligible_stages, valid_from, valid_until, created_at
            FROM loyalty_benefits
            WHERE valid_from <= NOW() AND valid_until > NOW()
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(benefits)
    }

    /// 记录权益使用
    ///
    /// 唯一约束冲突时不插入，返回 false
    pub async fn record_application(&self, benefit_id: i64, user_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO loyalty_benefit_applications (benefit_id, user_id, applied_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (benefit_id, user_id) DO NOTHING
            "#,
        )
        .bind(benefit_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl BenefitRepositoryTrait for BenefitRepository {
    async fn get(&self, id: i64) -> Result<Option<Benefit>> {
        self.get(id).await
    }

    async fn list_all(&self) -> Result<Vec<Benefit>> {
        self.list_all().await
    }

    async fn record_application(&self, benefit_id: i64, user_id: &str) -> Result<bool> {
        self.record_application(benefit_id, user_id).await
    }
}

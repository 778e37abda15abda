//! 积分账本仓储
//!
//! 提供积分流水的数据访问，余额由流水实时聚合

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::traits::LedgerRepositoryTrait;
use crate::error::Result;
use crate::models::{LedgerEntry, NewLedgerEntry};

/// 积分账本仓储（PostgreSQL）
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 创建账本记录
    pub async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let created = sqlx::query_as::<_, LedgerEntry>(
            r#"
            INSERT INTO loyalty_ledger (user_id, delta, entry_date, reason, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            RETURNING id, user_id, delta, entry_date, reason, expires_at, created_at
            "#,
        )
        .bind(&entry.user_id)
        .bind(entry.delta)
        .bind(entry.entry_date)
        .bind(entry.reason)
        .bind(entry.expires_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// 聚合用户余额，无记录返回 0
    pub async fn sum_deltas(&self, user_id: &str) -> Result<i64> {
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(delta), 0)::BIGINT
            FROM loyalty_ledger
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }

    /// 查询即将到期的入账流水
    pub async fn entries_expiring_before(
        &self,
        user_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, delta, entry_date, reason, expires_at, created_at
            FROM loyalty_ledger
            WHERE user_id = $1
              AND delta > 0
              AND expires_at IS NOT NULL
              AND expires_at < $2
            ORDER BY expires_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// 列出用户的账本记录
    ///
    /// 按时间倒序排列，返回最近的 limit 条记录
    pub async fn list_entries(&self, user_id: &str, limit: i64) -> Result<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT id, user_id, delta, entry_date, reason, expires_at, created_at
            FROM loyalty_ledger
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

#[async_trait]
impl LedgerRepositoryTrait for LedgerRepository {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        self.append_entry(entry).await
    }

    async fn sum_deltas(&self, user_id: &str) -> Result<i64> {
        self.sum_deltas(user_id).await
    }

    async fn entries_expiring_before(
        &self,
        user_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>> {
        self.entries_expiring_before(user_id, before).await
    }

    async fn list_entries(&self, user_id: &str, limit: i64) -> Result<Vec<LedgerEntry>> {
        self.list_entries(user_id, limit).await
    }
}

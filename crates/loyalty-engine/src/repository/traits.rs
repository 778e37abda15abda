//! 仓储 Trait 定义
//!
//! 定义仓储接口，便于服务层依赖抽象而非具体实现，支持 mock 测试

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Benefit, LedgerEntry, NewLedgerEntry, StageRecord};

/// 积分账本仓储接口
///
/// 只追加，不修改、不删除
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerRepositoryTrait: Send + Sync {
    /// 追加一条流水，返回带 ID 的记录
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry>;

    /// 用户全部流水的积分合计，无流水时为 0
    async fn sum_deltas(&self, user_id: &str) -> Result<i64>;

    /// 到期时间早于 before 的入账流水，按到期时间升序
    async fn entries_expiring_before(
        &self,
        user_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>>;

    /// 用户最近的流水，按时间倒序
    async fn list_entries(&self, user_id: &str, limit: i64) -> Result<Vec<LedgerEntry>>;
}

/// 会员阶段仓储接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StageRepositoryTrait: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<StageRecord>>;

    /// 按 user_id 插入或覆盖
    async fn upsert(&self, record: &StageRecord) -> Result<()>;
}

/// 权益目录接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BenefitRepositoryTrait: Send + Sync {
    async fn get(&self, id: i64) -> Result<Option<Benefit>>;

    async fn list_all(&self) -> Result<Vec<Benefit>>;

    /// 记录权益使用，返回是否为新记录（已使用过时返回 false）
    async fn record_application(&self, benefit_id: i64, user_id: &str) -> Result<bool>;
}

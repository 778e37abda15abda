//! 内存仓储
//!
//! 使用 DashMap 实现的进程内存储，适用于本地开发和测试环境。
//! 语义与 PostgreSQL 仓储保持一致。

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use super::traits::{BenefitRepositoryTrait, LedgerRepositoryTrait, StageRepositoryTrait};
use crate::error::{LoyaltyError, Result};
use crate::models::{Benefit, BenefitApplication, LedgerEntry, NewLedgerEntry, StageRecord};

/// 内存账本
///
/// 按用户分桶保存流水，ID 全局递增
#[derive(Debug, Clone, Default)]
pub struct MemoryLedgerRepository {
    entries: Arc<DashMap<String, Vec<LedgerEntry>>>,
    next_id: Arc<AtomicI64>,
    offline: Arc<AtomicBool>,
}

impl MemoryLedgerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟存储不可用，之后的所有操作都返回错误
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// 直接写入一条完整流水（用于构造历史数据）
    pub fn insert_entry(&self, entry: LedgerEntry) {
        self.next_id.fetch_max(entry.id, Ordering::SeqCst);
        self.entries
            .entry(entry.user_id.clone())
            .or_default()
            .push(entry);
    }

    /// 流水总数
    pub fn count(&self) -> usize {
        self.entries.iter().map(|e| e.value().len()).sum()
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LoyaltyError::StoreUnavailable(
                "内存账本已离线".to_string(),
            ));
        }
        Ok(())
    }

    fn snapshot(&self, user_id: &str) -> Vec<LedgerEntry> {
        self.entries
            .get(user_id)
            .map(|v| v.value().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LedgerRepositoryTrait for MemoryLedgerRepository {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        self.ensure_online()?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let created = LedgerEntry::from_new(id, entry, Utc::now());
        self.entries
            .entry(created.user_id.clone())
            .or_default()
            .push(created.clone());

        Ok(created)
    }

    async fn sum_deltas(&self, user_id: &str) -> Result<i64> {
        self.ensure_online()?;

        let total: i128 = self
            .entries
            .get(user_id)
            .map(|v| v.iter().map(|e| i128::from(e.delta)).sum())
            .unwrap_or(0);

        i64::try_from(total).map_err(|_| {
            LoyaltyError::Internal(format!("用户余额超出范围: user_id={}, total={}", user_id, total))
        })
    }

    async fn entries_expiring_before(
        &self,
        user_id: &str,
        before: DateTime<Utc>,
    ) -> Result<Vec<LedgerEntry>> {
        self.ensure_online()?;

        let mut entries: Vec<LedgerEntry> = self
            .snapshot(user_id)
            .into_iter()
            .filter(|e| e.is_credit() && e.expires_at.is_some_and(|t| t < before))
            .collect();
        entries.sort_by_key(|e| (e.expires_at, e.id));

        Ok(entries)
    }

    async fn list_entries(&self, user_id: &str, limit: i64) -> Result<Vec<LedgerEntry>> {
        self.ensure_online()?;

        let mut entries = self.snapshot(user_id);
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        entries.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(entries)
    }
}

/// 内存阶段存储
#[derive(Debug, Clone, Default)]
pub struct MemoryStageRepository {
    records: Arc<DashMap<String, StageRecord>>,
}

impl MemoryStageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.records.len()
    }
}

#[async_trait]
impl StageRepositoryTrait for MemoryStageRepository {
    async fn get(&self, user_id: &str) -> Result<Option<StageRecord>> {
        Ok(self.records.get(user_id).map(|r| r.value().clone()))
    }

    async fn upsert(&self, record: &StageRecord) -> Result<()> {
        match self.records.entry(record.user_id.clone()) {
            Entry::Occupied(mut existing) => {
                // applied_at 保持首次评定时间
                let applied_at = existing.get().applied_at;
                let updated = existing.get_mut();
                *updated = record.clone();
                updated.applied_at = applied_at;
            }
            Entry::Vacant(slot) => {
                slot.insert(record.clone());
            }
        }
        Ok(())
    }
}

/// 内存权益目录
#[derive(Debug, Clone, Default)]
pub struct MemoryBenefitRepository {
    benefits: Arc<DashMap<i64, Benefit>>,
    applications: Arc<DashMap<(i64, String), BenefitApplication>>,
}

impl MemoryBenefitRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置权益定义
    pub fn insert_benefit(&self, benefit: Benefit) {
        self.benefits.insert(benefit.id, benefit);
    }

    /// 查询使用记录
    pub fn application(&self, benefit_id: i64, user_id: &str) -> Option<BenefitApplication> {
        self.applications
            .get(&(benefit_id, user_id.to_string()))
            .map(|a| a.value().clone())
    }

    pub fn application_count(&self) -> usize {
        self.applications.len()
    }
}

#[async_trait]
impl BenefitRepositoryTrait for MemoryBenefitRepository {
    async fn get(&self, id: i64) -> Result<Option<Benefit>> {
        Ok(self.benefits.get(&id).map(|b| b.value().clone()))
    }

    async fn list_all(&self) -> Result<Vec<Benefit>> {
        let now = Utc::now();
        let mut benefits: Vec<Benefit> = self
            .benefits
            .iter()
            .filter(|b| b.value().is_active(now))
            .map(|b| b.value().clone())
            .collect();
        benefits.sort_by_key(|b| b.id);

        Ok(benefits)
    }

    async fn record_application(&self, benefit_id: i64, user_id: &str) -> Result<bool> {
        match self.applications.entry((benefit_id, user_id.to_string())) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(BenefitApplication {
                    benefit_id,
                    user_id: user_id.to_string(),
                    applied_at: Utc::now(),
                });
                Ok(true)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn create_test_benefit(id: i64, valid_from: DateTime<Utc>, valid_until: DateTime<Utc>) -> Benefit {
        Benefit {
            id,
            description: format!("权益 {}", id),
            eligible_stages: vec!["Gold".to_string()],
            valid_from,
            valid_until,
            created_at: valid_from,
        }
    }

    #[tokio::test]
    async fn test_ledger_append_and_sum() {
        let repo = MemoryLedgerRepository::new();
        let now = Utc::now();

        let first = repo
            .append_entry(NewLedgerEntry::accrual("user-1", 100, now, Duration::days(365)).unwrap())
            .await
            .unwrap();
        let second = repo
            .append_entry(NewLedgerEntry::redemption("user-1", 30, now))
            .await
            .unwrap();
        repo.append_entry(NewLedgerEntry::accrual("user-2", 5, now, Duration::days(365)).unwrap())
            .await
            .unwrap();

        assert!(second.id > first.id);
        assert_eq!(repo.sum_deltas("user-1").await.unwrap(), 70);
        assert_eq!(repo.sum_deltas("user-2").await.unwrap(), 5);
        assert_eq!(repo.sum_deltas("nobody").await.unwrap(), 0);
        assert_eq!(repo.count(), 3);
    }

    #[tokio::test]
    async fn test_ledger_sum_overflow_is_error() {
        let repo = MemoryLedgerRepository::new();
        let now = Utc::now();

        for points in [i64::MAX, 1] {
            repo.append_entry(NewLedgerEntry::accrual("user-1", points, now, Duration::days(1)).unwrap())
                .await
                .unwrap();
        }

        let result = repo.sum_deltas("user-1").await;
        assert!(matches!(result, Err(LoyaltyError::Internal(_))));
    }

    #[tokio::test]
    async fn test_ledger_expiring_only_credits_before_cutoff() {
        let repo = MemoryLedgerRepository::new();
        let now = Utc::now();

        repo.append_entry(NewLedgerEntry::accrual("user-1", 10, now, Duration::days(40)).unwrap())
            .await
            .unwrap();
        repo.append_entry(NewLedgerEntry::accrual("user-1", 20, now, Duration::days(5)).unwrap())
            .await
            .unwrap();
        repo.append_entry(NewLedgerEntry::redemption("user-1", 5, now))
            .await
            .unwrap();

        let expiring = repo
            .entries_expiring_before("user-1", now + Duration::days(30))
            .await
            .unwrap();

        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].delta, 20);
    }

    #[tokio::test]
    async fn test_ledger_list_newest_first_with_limit() {
        let repo = MemoryLedgerRepository::new();
        let now = Utc::now();

        for points in [1, 2, 3] {
            repo.append_entry(NewLedgerEntry::accrual("user-1", points, now, Duration::days(1)).unwrap())
                .await
                .unwrap();
        }

        let entries = repo.list_entries("user-1", 2).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].delta, 3);
        assert_eq!(entries[1].delta, 2);
    }

    #[tokio::test]
    async fn test_ledger_offline() {
        let repo = MemoryLedgerRepository::new();
        repo.set_offline(true);

        let result = repo.sum_deltas("user-1").await;
        assert!(matches!(result, Err(LoyaltyError::StoreUnavailable(_))));

        repo.set_offline(false);
        assert_eq!(repo.sum_deltas("user-1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_stage_upsert_keeps_applied_at() {
        let repo = MemoryStageRepository::new();
        let ladder = crate::models::StageLadder::default();
        let created = Utc::now() - Duration::days(10);

        let record = StageRecord::new("user-1", ladder.lowest(), created);
        repo.upsert(&record).await.unwrap();

        let mut promoted = StageRecord::new("user-1", ladder.classify(600), Utc::now());
        promoted.applied_at = Utc::now();
        repo.upsert(&promoted).await.unwrap();

        let stored = repo.get("user-1").await.unwrap().unwrap();
        assert_eq!(stored.stage, "Silver");
        assert_eq!(stored.applied_at, created);
        assert_eq!(repo.count(), 1);
    }

    #[tokio::test]
    async fn test_benefit_list_only_active() {
        let repo = MemoryBenefitRepository::new();
        let now = Utc::now();

        repo.insert_benefit(create_test_benefit(2, now - Duration::days(1), now + Duration::days(1)));
        repo.insert_benefit(create_test_benefit(1, now - Duration::days(1), now + Duration::days(1)));
        repo.insert_benefit(create_test_benefit(3, now - Duration::days(9), now - Duration::days(1)));
        repo.insert_benefit(create_test_benefit(4, now + Duration::days(1), now + Duration::days(9)));

        let ids: Vec<i64> = repo.list_all().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2]);

        // 过期权益仍可按 ID 查询
        assert!(repo.get(3).await.unwrap().is_some());
        assert!(repo.get(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_application_once() {
        let repo = MemoryBenefitRepository::new();

        assert!(repo.record_application(1, "user-1").await.unwrap());
        assert!(!repo.record_application(1, "user-1").await.unwrap());
        assert!(repo.record_application(1, "user-2").await.unwrap());

        assert_eq!(repo.application_count(), 2);
        assert!(repo.application(1, "user-1").is_some());
    }
}

//! 积分服务
//!
//! 处理余额查询、消费返积分和积分抵扣。
//! 返积分同样在用户积分锁内写入，写入前校验余额不会溢出。
//!
//! ## 抵扣流程
//!
//! 1. 参数校验 -> 2. 获取用户积分锁 -> 3. 计算余额 -> 4. 余额校验 -> 5. 写入出账流水
//!
//! 余额校验与写入在同一把用户锁内完成，余额不会被扣成负数。

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, instrument, warn};

use loyalty_shared::observability::metrics as loyalty_metrics;

use crate::error::{LoyaltyError, Result, ensure_user_id};
use crate::lock::LockManager;
use crate::models::NewLedgerEntry;
use crate::policy::LoyaltyPolicy;
use crate::repository::LedgerRepositoryTrait;
use crate::service::dto::{AccrualResult, LedgerEntryDto, RedemptionResult};
use crate::service::{DEFAULT_HISTORY_LIMIT, MAX_HISTORY_LIMIT};

/// 积分服务
pub struct PointsService {
    ledger: Arc<dyn LedgerRepositoryTrait>,
    locks: LockManager,
    policy: Arc<LoyaltyPolicy>,
}

impl PointsService {
    pub fn new(
        ledger: Arc<dyn LedgerRepositoryTrait>,
        locks: LockManager,
        policy: Arc<LoyaltyPolicy>,
    ) -> Self {
        Self {
            ledger,
            locks,
            policy,
        }
    }

    /// 查询可用积分
    ///
    /// 没有流水的用户余额为 0
    #[instrument(skip(self))]
    pub async fn get_available_points(&self, user_id: &str) -> Result<i64> {
        ensure_user_id(user_id)?;
        self.ledger.sum_deltas(user_id).await
    }

    /// 查询积分流水，按时间倒序
    #[instrument(skip(self))]
    pub async fn get_point_history(
        &self,
        user_id: &str,
        limit: Option<i64>,
    ) -> Result<Vec<LedgerEntryDto>> {
        ensure_user_id(user_id)?;

        let limit = match limit {
            None => DEFAULT_HISTORY_LIMIT,
            Some(l) if l < 1 => {
                return Err(LoyaltyError::Validation(format!(
                    "limit 必须大于 0: {}",
                    l
                )));
            }
            Some(l) => l.min(MAX_HISTORY_LIMIT),
        };

        let entries = self.ledger.list_entries(user_id, limit).await?;
        Ok(entries.into_iter().map(LedgerEntryDto::from).collect())
    }

    /// 消费返积分
    ///
    /// 返积分为 0 时不写流水
    #[instrument(skip(self))]
    pub async fn add_points(&self, user_id: &str, purchase_amount: f64) -> Result<AccrualResult> {
        ensure_user_id(user_id)?;

        let points = self.policy.points_for_purchase(purchase_amount)?;
        if points == 0 {
            info!(user_id = %user_id, purchase_amount, "消费金额不足以返积分");
            return Ok(AccrualResult {
                user_id: user_id.to_string(),
                points_earned: 0,
                entry_id: None,
                expires_at: None,
            });
        }

        let _guard = self.locks.acquire(&LockManager::points_key(user_id)).await?;

        let balance = self.ledger.sum_deltas(user_id).await?;
        if balance.checked_add(points).is_none() {
            warn!(user_id = %user_id, balance, points, "返积分后余额溢出");
            return Err(LoyaltyError::InvalidAmount(format!(
                "返积分后余额超出范围: balance={}, points={}",
                balance, points
            )));
        }

        let entry = self
            .ledger
            .append_entry(NewLedgerEntry::accrual(
                user_id,
                points,
                Utc::now(),
                self.policy.point_validity,
            )?)
            .await?;

        loyalty_metrics::record_points_accrued(points);
        info!(
            user_id = %user_id,
            purchase_amount,
            points_earned = points,
            entry_id = entry.id,
            "消费返积分成功"
        );

        Ok(AccrualResult {
            user_id: user_id.to_string(),
            points_earned: points,
            entry_id: Some(entry.id),
            expires_at: entry.expires_at,
        })
    }

    /// 积分抵扣
    ///
    /// 余额不足时不产生任何流水
    #[instrument(skip(self))]
    pub async fn use_points(&self, user_id: &str, points: i64) -> Result<RedemptionResult> {
        ensure_user_id(user_id)?;

        if points <= 0 {
            loyalty_metrics::record_redemption("invalid_amount", points);
            return Err(LoyaltyError::InvalidAmount(format!(
                "抵扣积分必须大于 0: {}",
                points
            )));
        }

        let _guard = self.locks.acquire(&LockManager::points_key(user_id)).await?;

        let balance = match self.ledger.sum_deltas(user_id).await {
            Ok(balance) => balance,
            Err(e) => {
                loyalty_metrics::record_redemption("error", points);
                return Err(e);
            }
        };

        if balance < points {
            loyalty_metrics::record_redemption("insufficient_balance", points);
            warn!(
                user_id = %user_id,
                required = points,
                available = balance,
                "积分余额不足"
            );
            return Err(LoyaltyError::InsufficientBalance {
                required: points,
                available: balance,
            });
        }

        let entry = match self
            .ledger
            .append_entry(NewLedgerEntry::redemption(user_id, points, Utc::now()))
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                loyalty_metrics::record_redemption("error", points);
                return Err(e);
            }
        };

        loyalty_metrics::record_redemption("success", points);
        info!(
            user_id = %user_id,
            points_used = points,
            balance_after = balance - points,
            entry_id = entry.id,
            "积分抵扣成功"
        );

        Ok(RedemptionResult {
            user_id: user_id.to_string(),
            points_used: points,
            balance_after: balance - points,
            entry_id: entry.id,
        })
    }
}

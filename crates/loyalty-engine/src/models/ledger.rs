//! 积分账本实体定义
//!
//! 账本只追加不修改，余额由流水求和得到

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::enums::LedgerReason;
use crate::error::{LoyaltyError, Result};

/// 积分账本流水
///
/// 每次入账或出账产生一条，创建后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: i64,
    /// 用户 ID
    pub user_id: String,
    /// 带符号的积分变动值
    pub delta: i64,
    /// 记账日期
    pub entry_date: NaiveDate,
    /// 变动原因
    pub reason: LedgerReason,
    /// 积分到期时间（仅入账流水有值）
    #[sqlx(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// 由待写入流水和存储分配的 ID 构造
    pub fn from_new(id: i64, entry: NewLedgerEntry, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: entry.user_id,
            delta: entry.delta,
            entry_date: entry.entry_date,
            reason: entry.reason,
            expires_at: entry.expires_at,
            created_at,
        }
    }

    /// 是否为入账流水
    pub fn is_credit(&self) -> bool {
        self.delta > 0
    }

    /// 是否在 [now, until) 内到期
    ///
    /// 已经过期的流水不再提醒
    pub fn expires_within(&self, now: DateTime<Utc>, until: DateTime<Utc>) -> bool {
        self.is_credit() && self.expires_at.is_some_and(|t| t >= now && t < until)
    }
}

/// 待写入的账本流水
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerEntry {
    pub user_id: String,
    pub delta: i64,
    pub entry_date: NaiveDate,
    pub reason: LedgerReason,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewLedgerEntry {
    /// 消费返积分流水
    ///
    /// 到期时间超出可表示范围时返回错误
    pub fn accrual(
        user_id: impl Into<String>,
        points: i64,
        now: DateTime<Utc>,
        validity: Duration,
    ) -> Result<Self> {
        let expires_at = now.checked_add_signed(validity).ok_or_else(|| {
            LoyaltyError::Validation(format!("积分有效期超出范围: {}", validity))
        })?;

        Ok(Self {
            user_id: user_id.into(),
            delta: points * LedgerReason::PurchaseAccrual.sign(),
            entry_date: now.date_naive(),
            reason: LedgerReason::PurchaseAccrual,
            expires_at: Some(expires_at),
        })
    }

    /// 积分抵扣流水
    pub fn redemption(user_id: impl Into<String>, points: i64, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            delta: points * LedgerReason::PointRedemption.sign(),
            entry_date: now.date_naive(),
            reason: LedgerReason::PointRedemption,
            expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accrual_entry() {
        let now = Utc::now();
        let entry = NewLedgerEntry::accrual("user-1", 120, now, Duration::days(365)).unwrap();

        assert_eq!(entry.delta, 120);
        assert_eq!(entry.reason, LedgerReason::PurchaseAccrual);
        assert_eq!(entry.entry_date, now.date_naive());
        assert_eq!(entry.expires_at, Some(now + Duration::days(365)));
    }

    #[test]
    fn test_redemption_entry_is_negative() {
        let entry = NewLedgerEntry::redemption("user-1", 80, Utc::now());

        assert_eq!(entry.delta, -80);
        assert_eq!(entry.reason, LedgerReason::PointRedemption);
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_accrual_rejects_unrepresentable_expiry() {
        let now = Utc::now();
        let result = NewLedgerEntry::accrual("user-1", 10, now, Duration::MAX);

        assert!(matches!(result, Err(LoyaltyError::Validation(_))));
    }

    #[test]
    fn test_expires_within_window() {
        let now = Utc::now();
        let until = now + Duration::days(30);
        let mut entry = LedgerEntry::from_new(
            1,
            NewLedgerEntry::accrual("user-1", 10, now, Duration::days(10)).unwrap(),
            now,
        );
        assert!(entry.expires_within(now, until));

        // 窗口右边界不包含
        entry.expires_at = Some(until);
        assert!(!entry.expires_within(now, until));

        // 已过期的不计入
        entry.expires_at = Some(now - Duration::seconds(1));
        assert!(!entry.expires_within(now, until));

        // 无到期时间
        entry.expires_at = None;
        assert!(!entry.expires_within(now, until));
    }

    #[test]
    fn test_debit_never_expires_within_window() {
        let now = Utc::now();
        let mut entry =
            LedgerEntry::from_new(2, NewLedgerEntry::redemption("user-1", 10, now), now);
        entry.expires_at = Some(now + Duration::days(1));

        assert!(!entry.is_credit());
        assert!(!entry.expires_within(now, now + Duration::days(30)));
    }

    #[test]
    fn test_ledger_entry_serialization() {
        let now = Utc::now();
        let entry = LedgerEntry::from_new(
            7,
            NewLedgerEntry::accrual("user-1", 10, now, Duration::days(1)).unwrap(),
            now,
        );

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["delta"], 10);
        assert_eq!(json["reason"], "PURCHASE_ACCRUAL");
        assert!(json["expiresAt"].is_string());
    }
}

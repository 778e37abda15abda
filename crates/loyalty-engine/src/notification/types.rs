//! 通知类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::LedgerEntry;

/// 积分到期提醒
///
/// 只携带结构化数据，不包含展示文案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpirationNotice {
    pub user_id: String,
    /// 即将到期的入账流水数
    pub entry_count: usize,
    /// 即将到期的积分合计
    pub expiring_points: i64,
    /// 最早的到期时间
    pub earliest_expiry: DateTime<Utc>,
}

impl ExpirationNotice {
    /// 由即将到期的流水汇总
    ///
    /// 没有可汇总的流水时返回 None
    pub fn from_entries(user_id: &str, entries: &[LedgerEntry]) -> Option<Self> {
        let earliest_expiry = entries.iter().filter_map(|e| e.expires_at).min()?;

        Some(Self {
            user_id: user_id.to_string(),
            entry_count: entries.len(),
            expiring_points: entries.iter().map(|e| e.delta).sum(),
            earliest_expiry,
        })
    }
}

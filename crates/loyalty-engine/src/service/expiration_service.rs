//! 积分到期提醒服务
//!
//! 判断用户是否有积分在提醒窗口内到期，有则发送一次提醒

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, instrument};

use loyalty_shared::observability::metrics as loyalty_metrics;

use crate::error::{Result, ensure_user_id};
use crate::models::LedgerEntry;
use crate::notification::{ExpirationNotice, Notifier};
use crate::policy::LoyaltyPolicy;
use crate::repository::LedgerRepositoryTrait;
use crate::service::dto::ExpirationCheckResult;

/// 到期提醒服务
pub struct ExpirationService {
    ledger: Arc<dyn LedgerRepositoryTrait>,
    notifier: Arc<dyn Notifier>,
    policy: Arc<LoyaltyPolicy>,
}

impl ExpirationService {
    pub fn new(
        ledger: Arc<dyn LedgerRepositoryTrait>,
        notifier: Arc<dyn Notifier>,
        policy: Arc<LoyaltyPolicy>,
    ) -> Self {
        Self {
            ledger,
            notifier,
            policy,
        }
    }

    /// 检查并发送到期提醒
    ///
    /// 窗口为 [now, now + expiry_notice_window)，已过期的积分不再提醒
    #[instrument(skip(self))]
    pub async fn notify_expiration(&self, user_id: &str) -> Result<ExpirationCheckResult> {
        ensure_user_id(user_id)?;

        let now = Utc::now();
        let until = self.policy.notice_until(now)?;

        let expiring: Vec<LedgerEntry> = self
            .ledger
            .entries_expiring_before(user_id, until)
            .await?
            .into_iter()
            .filter(|e| e.expires_within(now, until))
            .collect();

        let Some(notice) = ExpirationNotice::from_entries(user_id, &expiring) else {
            loyalty_metrics::record_expiration_check(false);
            debug!(user_id = %user_id, "提醒窗口内没有到期积分");
            return Ok(ExpirationCheckResult {
                user_id: user_id.to_string(),
                will_notify: false,
                notice: None,
            });
        };

        self.notifier.send(user_id, &notice).await?;

        loyalty_metrics::record_expiration_check(true);
        info!(
            user_id = %user_id,
            entry_count = notice.entry_count,
            expiring_points = notice.expiring_points,
            "已发送积分到期提醒"
        );

        Ok(ExpirationCheckResult {
            user_id: user_id.to_string(),
            will_notify: true,
            notice: Some(notice),
        })
    }
}

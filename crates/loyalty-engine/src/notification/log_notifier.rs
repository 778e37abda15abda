//! 日志通知
//!
//! 不对外投递，只记录提醒内容

use async_trait::async_trait;
use tracing::info;

use super::{ExpirationNotice, Notifier};
use crate::error::Result;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, user_id: &str, notice: &ExpirationNotice) -> Result<()> {
        info!(
            user_id = %user_id,
            entry_count = notice.entry_count,
            expiring_points = notice.expiring_points,
            earliest_expiry = %notice.earliest_expiry,
            "积分到期提醒"
        );
        Ok(())
    }
}

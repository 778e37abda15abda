//! 通知模块
//!
//! 引擎只决定是否需要提醒，文案和投递由通知实现负责。
//!
//! ## 实现
//!
//! - `LogNotifier`：只写日志，用于开发环境
//! - `WebhookNotifier`：通过 HTTP 推送到通知网关

mod log_notifier;
mod types;
mod webhook;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use loyalty_shared::config::NotifierConfig;

use crate::error::Result;

pub use log_notifier::LogNotifier;
pub use types::ExpirationNotice;
pub use webhook::WebhookNotifier;

/// 通知发送接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// 发送积分到期提醒，返回即表示网关已确认接收
    async fn send(&self, user_id: &str, notice: &ExpirationNotice) -> Result<()>;
}

/// 根据配置创建通知实现
///
/// 配置了 webhook_url 时使用 Webhook，否则只记录日志
pub fn build_notifier(config: &NotifierConfig) -> Result<Arc<dyn Notifier>> {
    match config.webhook_url.as_deref().filter(|url| !url.trim().is_empty()) {
        Some(url) => Ok(Arc::new(WebhookNotifier::new(
            url,
            Duration::from_secs(config.timeout_seconds),
        )?)),
        None => Ok(Arc::new(LogNotifier)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_notifier_from_config() {
        assert!(build_notifier(&NotifierConfig::default()).is_ok());

        let config = NotifierConfig {
            webhook_url: Some("http://localhost:9000/notify".to_string()),
            timeout_seconds: 2,
        };
        assert!(build_notifier(&config).is_ok());

        let config = NotifierConfig {
            webhook_url: Some("   ".to_string()),
            timeout_seconds: 2,
        };
        assert!(build_notifier(&config).is_ok());
    }
}

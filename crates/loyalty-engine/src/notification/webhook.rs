//! Webhook 通知
//!
//! 以 JSON POST 到通知网关，2xx 视为投递确认

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{ExpirationNotice, Notifier};
use crate::error::{LoyaltyError, Result};

/// 推送到网关的消息体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WebhookPayload<'a> {
    notification_id: String,
    notification_type: &'static str,
    #[serde(flatten)]
    notice: &'a ExpirationNotice,
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoyaltyError::Internal(format!("创建 HTTP 客户端失败: {}", e)))?;

        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send(&self, user_id: &str, notice: &ExpirationNotice) -> Result<()> {
        let payload = WebhookPayload {
            notification_id: Uuid::new_v4().to_string(),
            notification_type: "POINTS_EXPIRING",
            notice,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                warn!(url = %self.url, user_id = %user_id, error = %e, "Webhook 通知发送失败");
                LoyaltyError::StoreUnavailable(format!("通知网关不可用: {}", e))
            })?;

        debug!(
            notification_id = %payload.notification_id,
            status = %response.status(),
            "Webhook 通知已确认"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_payload_flattens_notice() {
        let notice = ExpirationNotice {
            user_id: "user-1".to_string(),
            entry_count: 2,
            expiring_points: 40,
            earliest_expiry: Utc::now(),
        };
        let payload = WebhookPayload {
            notification_id: "n-1".to_string(),
            notification_type: "POINTS_EXPIRING",
            notice: &notice,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["notificationType"], "POINTS_EXPIRING");
        assert_eq!(json["userId"], "user-1");
        assert_eq!(json["expiringPoints"], 40);
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_store_unavailable() {
        // 绑定后立即释放端口，保证连接被拒绝
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let notifier =
            WebhookNotifier::new(&format!("http://{}/notify", addr), Duration::from_secs(1))
                .unwrap();
        let notice = ExpirationNotice {
            user_id: "user-1".to_string(),
            entry_count: 1,
            expiring_points: 10,
            earliest_expiry: Utc::now(),
        };

        let result = notifier.send("user-1", &notice).await;
        assert!(matches!(result, Err(LoyaltyError::StoreUnavailable(_))));
    }
}

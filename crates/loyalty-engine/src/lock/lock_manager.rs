//! 进程内按键加锁
//!
//! 每个键对应一把 tokio 互斥锁，锁释放且无人等待时从表中移除。

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use loyalty_shared::config::LockConfig;

use crate::error::{LoyaltyError, Result};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// 用户锁管理器
#[derive(Debug, Clone)]
pub struct LockManager {
    locks: Arc<LockTable>,
    acquire_timeout: Duration,
}

impl LockManager {
    pub fn new(acquire_timeout: Duration) -> Self {
        Self {
            locks: Arc::new(DashMap::new()),
            acquire_timeout,
        }
    }

    pub fn from_config(config: &LockConfig) -> Self {
        Self::new(Duration::from_millis(config.acquire_timeout_ms))
    }

    /// 积分变更锁的键
    pub fn points_key(user_id: &str) -> String {
        format!("points:{}", user_id)
    }

    /// 阶段评定锁的键
    pub fn stage_key(user_id: &str) -> String {
        format!("stage:{}", user_id)
    }

    /// 获取锁
    ///
    /// 超过等待时间仍未获取到锁时返回 `ConcurrencyConflict`
    pub async fn acquire(&self, key: &str) -> Result<LockGuard> {
        let mutex = self.locks.entry(key.to_string()).or_default().clone();

        match tokio::time::timeout(self.acquire_timeout, mutex.lock_owned()).await {
            Ok(guard) => {
                debug!(key = %key, "User lock acquired");
                Ok(LockGuard {
                    key: key.to_string(),
                    guard: Some(guard),
                    locks: Arc::clone(&self.locks),
                })
            }
            Err(_) => {
                warn!(
                    key = %key,
                    timeout_ms = self.acquire_timeout.as_millis() as u64,
                    "User lock acquisition timed out"
                );
                Err(LoyaltyError::ConcurrencyConflict(key.to_string()))
            }
        }
    }

    /// 当前锁表中的键数量
    pub fn active_keys(&self) -> usize {
        self.locks.len()
    }
}

impl Default for LockManager {
    fn default() -> Self {
        Self::from_config(&LockConfig::default())
    }
}

/// 锁守卫
///
/// Drop 时释放锁，并在没有其他持有者时清理锁表
pub struct LockGuard {
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
    locks: Arc<LockTable>,
}

impl LockGuard {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        // 先释放守卫持有的 Arc，计数为 1 说明只剩锁表自身引用
        self.guard.take();
        self.locks
            .remove_if(&self.key, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

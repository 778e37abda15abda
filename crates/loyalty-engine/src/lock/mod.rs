//! 用户锁模块
//!
//! 同一用户的积分变更和阶段评定必须串行执行，不同用户之间互不阻塞。
//!
//! ## 使用示例
//!
//! ```ignore
//! let locks = LockManager::new(Duration::from_secs(5));
//!
//! let _guard = locks.acquire(&LockManager::points_key("user-1")).await?;
//! // 读余额、校验、写流水
//! ```

mod lock_manager;

pub use lock_manager::{LockGuard, LockManager};

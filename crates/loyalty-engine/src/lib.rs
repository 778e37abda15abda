//! 积分引擎
//!
//! 提供会员积分账本、会员阶段、权益使用和积分到期提醒的业务逻辑。
//!
//! ## 核心功能
//!
//! - **积分账本**：只追加的积分流水，余额实时由流水求和
//! - **消费返积分**：按配置的基点比例向下取整返积分
//! - **积分抵扣**：同一用户的抵扣串行执行，余额不会为负
//! - **会员阶段**：按阶梯表由余额映射阶段，只在变化时写入
//! - **权益使用**：校验有效期与阶段，同一权益每个用户只记录一次
//! - **到期提醒**：提醒窗口内有积分到期时通知一次
//!
//! ## 模块结构
//!
//! - `models`: 领域模型定义
//! - `error`: 错误类型定义
//! - `policy`: 积分策略
//! - `repository`: PostgreSQL 与内存仓储
//! - `lock`: 用户锁
//! - `notification`: 通知接口与实现
//! - `service`: 业务服务层
//! - `engine`: 服务装配

pub mod engine;
pub mod error;
pub mod lock;
pub mod models;
pub mod notification;
pub mod policy;
pub mod repository;
pub mod service;

pub use engine::{LoyaltyEngine, Stores};
pub use error::{LoyaltyError, Result};
pub use lock::{LockGuard, LockManager};
pub use models::*;
pub use notification::{ExpirationNotice, LogNotifier, Notifier, WebhookNotifier, build_notifier};
pub use policy::LoyaltyPolicy;
pub use repository::{
    BenefitRepository, LedgerRepository, MemoryBenefitRepository, MemoryLedgerRepository,
    MemoryStageRepository, StageRepository,
};
pub use service::{BenefitService, ExpirationService, PointsService, StageService, dto};

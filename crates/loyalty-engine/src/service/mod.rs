//! 服务层
//!
//! 实现积分业务逻辑，协调仓储、用户锁和通知。
//!
//! ## 模块结构
//!
//! - `dto`: 数据传输对象定义
//! - `points_service`: 余额查询、消费返积分、积分抵扣
//! - `stage_service`: 会员阶段查询与重算
//! - `benefit_service`: 权益目录与权益使用
//! - `expiration_service`: 积分到期提醒

pub mod benefit_service;
pub mod dto;
pub mod expiration_service;
pub mod points_service;
pub mod stage_service;

pub use benefit_service::BenefitService;
pub use dto::*;
pub use expiration_service::ExpirationService;
pub use points_service::PointsService;
pub use stage_service::StageService;

/// 历史查询默认条数
pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
/// 历史查询最大条数
pub const MAX_HISTORY_LIMIT: i64 = 500;

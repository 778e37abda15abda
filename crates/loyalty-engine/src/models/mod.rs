//! 积分服务领域模型
//!
//! 包含账本流水、会员阶段、权益等核心实体定义

pub mod benefit;
pub mod enums;
pub mod ledger;
pub mod stage;

pub use benefit::{Benefit, BenefitApplication};
pub use enums::LedgerReason;
pub use ledger::{LedgerEntry, NewLedgerEntry};
pub use stage::{StageLadder, StageRecord, StageTier};
